use chrono::naive::NaiveDate;
use serde::Serialize;
use tracing::warn;

use super::aggregate::{self,RegionTotals,SeriesRow};
use super::dataset::Dataset;
use super::error::{Result,Error};
use super::graph::Series;
use super::selection::{Metric,Selection};


/// Everything one render pass shows, ready to be charted.
#[derive(Serialize,Clone,PartialEq,Debug)]
pub struct Dashboard {
    pub selection: Selection,
    pub as_of: Option<NaiveDate>,
    pub scatter: Vec<RegionTotals>,
    pub bar: Vec<RegionTotals>,
    pub county: Option<CountyView>,
}

#[derive(Serialize,Clone,PartialEq,Debug)]
pub struct CountyView {
    pub summary: Vec<SeriesRow>,
    pub cases: Series,
    pub moving_average: Series,
}


impl Dashboard {

    pub fn build(data: &Dataset, selection: &Selection) -> Self {

	let totals = aggregate::region_totals(data.records());

	let county = match county_view(data, selection) {
	    Ok(view) => Some(view),
	    Err(err) => {
		warn!("{}", err);
		None
	    }
	};

	Dashboard {
	    selection: selection.clone(),
	    as_of: data.last_date(),
	    scatter: aggregate::rank(&totals, Metric::Cases, selection.state_count),
	    bar: aggregate::rank(&totals, selection.metric, selection.state_count),
	    county,
	}

    }

}


fn county_view(data: &Dataset, selection: &Selection) -> Result<CountyView> {

    let series = aggregate::county_series(data, &selection.state, &selection.county,
					  selection.window);
    if series.is_empty() {
	return Err(Error::NoData(format!("{}, {}", selection.county, selection.state)));
    }

    let start = series.len().saturating_sub(selection.summary_days);

    Ok(CountyView {
	summary: series[start..].to_vec(),
	cases: series.iter().filter_map(
	    |r| r.cases.map(|cases| (r.date, cases as f64))
	).collect(),
	moving_average: series.iter().filter_map(
	    |r| r.moving_average.map(|avg| (r.date, avg))
	).collect(),
    })

}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::dataset::tests::sample;

    fn selection(state: &str, county: &str, days: usize) -> Selection {
	Selection::new(state, county, Metric::Deaths, 10, days, 5).unwrap()
    }

    #[test]
    fn summary_returns_available_rows() {
	let dash = Dashboard::build(&sample(), &selection("California", "Alpha", 7));
	let county = dash.county.unwrap();
	assert_eq!(county.summary.len(), 4);
	assert_eq!(county.cases.iter().map(|(_,v)| *v).collect::<Vec<_>>(),
		   vec![10.0, 10.0, 12.0, 15.0]);
	assert!(county.moving_average.is_empty());
    }

    #[test]
    fn summary_keeps_last_days() {
	let dash = Dashboard::build(&sample(), &selection("California", "Beta", 3));
	let summary = dash.county.unwrap().summary;
	assert_eq!(summary.len(), 3);
	assert_eq!(summary[0].date, NaiveDate::from_ymd_opt(2020, 3, 2).unwrap());
	assert_eq!(summary[2].date, NaiveDate::from_ymd_opt(2020, 3, 4).unwrap());
    }

    #[test]
    fn charts_rank_states() {
	let dash = Dashboard::build(&sample(), &selection("California", "Alpha", 7));
	assert_eq!(dash.scatter.iter().map(|t| t.state.as_str()).collect::<Vec<_>>(),
		   vec!["CA", "Puerto Rico"]);
	assert_eq!(dash.bar[0].state, "CA");
	assert_eq!(dash.bar[0].deaths, 3);
	assert_eq!(dash.as_of, NaiveDate::from_ymd_opt(2020, 3, 4));

	let sel = Selection::new("California", "Alpha", Metric::Cases, 1, 7, 5).unwrap();
	let dash = Dashboard::build(&sample(), &sel);
	assert_eq!(dash.scatter.len(), 1);
	assert_eq!(dash.bar.len(), 1);
    }

    #[test]
    fn missing_county_is_no_data() {
	let dash = Dashboard::build(&sample(), &selection("Atlantis", "", 7));
	assert!(dash.county.is_none());
	assert_eq!(dash.scatter.len(), 2);
	assert!(matches!(county_view(&sample(), &selection("California", "Gamma", 7)),
			 Err(Error::NoData(_))));
    }

    #[test]
    fn unreported_cases_leave_gaps() {
	let data = Dataset::from_reader("\
date,county,state,cases,deaths
2021-03-01,Adjuntas,Puerto Rico,40,
2021-03-02,Adjuntas,Puerto Rico,,
2021-03-03,Adjuntas,Puerto Rico,45,1
".as_bytes()).unwrap();
	let dash = Dashboard::build(&data, &selection("Puerto Rico", "Adjuntas", 7));
	let county = dash.county.unwrap();
	assert_eq!(county.summary.len(), 3);
	assert_eq!(county.cases.iter().map(|(_,v)| *v).collect::<Vec<_>>(), vec![40.0, 45.0]);
	assert!(county.summary.iter().all(|r| r.new_cases.is_none()));
	assert_eq!(dash.scatter[0].cases, 45);
    }

    #[test]
    fn rebuilding_is_identical() {
	let data = sample();
	let sel = selection("California", "Beta", 7);
	let first = serde_json::to_string(&Dashboard::build(&data, &sel)).unwrap();
	let second = serde_json::to_string(&Dashboard::build(&data, &sel)).unwrap();
	assert_eq!(first, second);
    }

}
