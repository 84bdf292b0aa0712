use std::io;
use std::collections::BTreeSet;

use chrono::naive::NaiveDate;

use super::error::{Result,Error};


/// One county observation. Counts are cumulative; an empty cell is an
/// unreported count.
#[derive(Clone,Debug,PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub county: String,
    pub state: String,
    pub cases: Option<u64>,
    pub deaths: Option<u64>,
}

/// The parsed snapshot, ordered by date.
#[derive(Clone,Debug,Default)]
pub struct Dataset {
    records: Vec<Record>,
}

struct Columns {
    date: usize,
    county: usize,
    state: usize,
    cases: usize,
    deaths: usize,
}

impl Columns {

    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
	let require = |name: &'static str| headers.iter().position(|h| h.trim() == name)
	    .ok_or(Error::MissingColumn(name));
	Ok(Columns {
	    date: require("date")?,
	    county: require("county")?,
	    state: require("state")?,
	    cases: require("cases")?,
	    deaths: require("deaths")?,
	})
    }

    fn record(&self, row: &csv::StringRecord) -> Result<Record> {
	let field = |i: usize| row.get(i).unwrap_or("").trim();
	Ok(Record {
	    date: NaiveDate::parse_from_str(field(self.date), "%Y-%m-%d")?,
	    county: field(self.county).to_string(),
	    state: field(self.state).to_string(),
	    cases: count(field(self.cases))?,
	    deaths: count(field(self.deaths))?,
	})
    }

}

fn count(field: &str) -> Result<Option<u64>> {
    match field {
	"" => Ok(None),
	field => Ok(Some(field.parse()?)),
    }
}


impl Dataset {

    pub fn new(mut records: Vec<Record>) -> Self {
	records.sort_by_key(|r| r.date);
	Dataset { records }
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
	let mut reader = csv::Reader::from_reader(reader);
	let columns = Columns::from_headers(reader.headers()?)?;
	let records = reader.records().map(
	    |row| columns.record(&row?)
	).collect::<Result<Vec<_>>>()?;
	Ok(Self::new(records))
    }

    pub fn records(&self) -> &[Record] {
	&self.records
    }

    pub fn len(&self) -> usize {
	self.records.len()
    }

    pub fn is_empty(&self) -> bool {
	self.records.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
	self.records.last().map(|r| r.date)
    }

    pub fn states(&self) -> Vec<String> {
	self.records.iter().map(|r| r.state.as_str())
	    .collect::<BTreeSet<_>>().into_iter()
	    .map(str::to_string).collect()
    }

    pub fn counties(&self, state: &str) -> Vec<String> {
	self.records.iter().filter(|r| r.state == state)
	    .map(|r| r.county.as_str())
	    .collect::<BTreeSet<_>>().into_iter()
	    .map(str::to_string).collect()
    }

    /// Records of one county, in date order.
    pub fn county_records<'a>(&'a self, state: &'a str, county: &'a str)
			      -> impl Iterator<Item = &'a Record> + 'a {
	self.records.iter().filter(move |r| r.state == state && r.county == county)
    }

}
