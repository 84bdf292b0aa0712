use std::collections::{BTreeMap,HashMap};

use chrono::naive::NaiveDate;
use lazy_static::lazy_static;
use serde::Serialize;

use super::dataset::{Dataset,Record};
use super::selection::Metric;


lazy_static! {
    static ref STATE_ABBREV: HashMap<&'static str,&'static str> = vec![
	("Alabama", "AL"), ("Alaska", "AK"), ("Arizona", "AZ"), ("Arkansas", "AR"),
	("California", "CA"), ("Colorado", "CO"), ("Connecticut", "CT"), ("Delaware", "DE"),
	("Florida", "FL"), ("Georgia", "GA"), ("Hawaii", "HI"), ("Idaho", "ID"),
	("Illinois", "IL"), ("Indiana", "IN"), ("Iowa", "IA"), ("Kansas", "KS"),
	("Kentucky", "KY"), ("Louisiana", "LA"), ("Maine", "ME"), ("Maryland", "MD"),
	("Massachusetts", "MA"), ("Michigan", "MI"), ("Minnesota", "MN"), ("Mississippi", "MS"),
	("Missouri", "MO"), ("Montana", "MT"), ("Nebraska", "NE"), ("Nevada", "NV"),
	("New Hampshire", "NH"), ("New Jersey", "NJ"), ("New Mexico", "NM"), ("New York", "NY"),
	("North Carolina", "NC"), ("North Dakota", "ND"), ("Ohio", "OH"), ("Oklahoma", "OK"),
	("Oregon", "OR"), ("Pennsylvania", "PA"), ("Rhode Island", "RI"), ("South Carolina", "SC"),
	("South Dakota", "SD"), ("Tennessee", "TN"), ("Texas", "TX"), ("Utah", "UT"),
	("Vermont", "VT"), ("Virginia", "VA"), ("Washington", "WA"), ("West Virginia", "WV"),
	("Wisconsin", "WI"), ("Wyoming", "WY")
    ].into_iter().collect();
}

/// Postal abbreviation for one of the 50 states; other names pass through.
pub fn abbreviate(state: &str) -> &str {
    STATE_ABBREV.get(state).copied().unwrap_or(state)
}


#[derive(Serialize,Clone,PartialEq,Debug)]
pub struct RegionTotals {
    pub state: String,
    pub cases: u64,
    pub deaths: u64,
}

impl RegionTotals {
    pub fn get(&self, metric: Metric) -> u64 {
	match metric {
	    Metric::Cases => self.cases,
	    Metric::Deaths => self.deaths,
	}
    }
}

/// Latest cumulative counts per county (maximum of each count taken
/// independently, unreported counts skipped), summed per state. Rows are
/// ordered by full state name.
pub fn region_totals(records: &[Record]) -> Vec<RegionTotals> {

    let mut by_county = BTreeMap::new();
    for record in records {
	let (cases,deaths) = by_county.entry((record.state.as_str(), record.county.as_str()))
	    .or_insert((None,None));
	*cases = record.cases.max(*cases);
	*deaths = record.deaths.max(*deaths);
    }

    let mut by_state = BTreeMap::new();
    for ((state,_county),(cases,deaths)) in by_county {
	let sum = by_state.entry(state).or_insert((0,0));
	sum.0 += cases.unwrap_or(0);
	sum.1 += deaths.unwrap_or(0);
    }

    by_state.into_iter().map(
	|(state,(cases,deaths))| RegionTotals {
	    state: abbreviate(state).to_string(), cases, deaths
	}
    ).collect()

}

/// Top `n` states by `metric`, descending. Ties are ordered by name.
pub fn rank(totals: &[RegionTotals], metric: Metric, n: usize) -> Vec<RegionTotals> {
    let mut ranked = totals.to_vec();
    ranked.sort_by(|a,b| b.get(metric).cmp(&a.get(metric))
		   .then_with(|| a.state.cmp(&b.state)));
    ranked.truncate(n);
    ranked
}


#[derive(Serialize,Clone,PartialEq,Debug)]
pub struct SeriesRow {
    pub date: NaiveDate,
    pub cases: Option<u64>,
    pub deaths: Option<u64>,
    pub new_cases: Option<i64>,
    pub moving_average: Option<f64>,
}

/// Date-ordered series of one county with daily new cases and their
/// trailing `window`-day average.
pub fn county_series(data: &Dataset, state: &str, county: &str, window: usize) -> Vec<SeriesRow> {

    let mut records : Vec<&Record> = data.county_records(state, county).collect();
    records.sort_by_key(|r| r.date);

    let new_cases = daily(&records.iter().map(|r| r.cases).collect::<Vec<_>>());
    let averages = moving_average(&new_cases, window);

    records.iter().zip(new_cases).zip(averages).map(
	|((r,new_cases),moving_average)| SeriesRow {
	    date: r.date,
	    cases: r.cases,
	    deaths: r.deaths,
	    new_cases,
	    moving_average,
	}
    ).collect()

}

/// First difference. Undefined for the first entry and next to an
/// unreported count; decreases are kept.
fn daily(cumulative: &[Option<u64>]) -> Vec<Option<i64>> {
    (0..cumulative.len()).map(|i| match (i, cumulative[i]) {
	(0,_) => None,
	(i,Some(today)) => cumulative[i-1].map(|yesterday| today as i64 - yesterday as i64),
	(_,None) => None,
    }).collect()
}

/// Trailing mean; undefined while the window holds an undefined value.
fn moving_average(data: &[Option<i64>], window: usize) -> Vec<Option<f64>> {
    (0..data.len()).map(|i| match window > 0 && i + 1 >= window {
	false => None,
	true => data[i + 1 - window ..= i].iter()
	    .try_fold(0i64, |sum,v| v.map(|v| sum + v))
	    .map(|sum| sum as f64 / window as f64),
    }).collect()
}
