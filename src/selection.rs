use clap::ValueEnum;
use serde::Serialize;

use super::dataset::Dataset;
use super::error::{Result,Error};


/// Quantity the state bar chart is ranked by.
#[derive(ValueEnum,Serialize,Clone,Copy,PartialEq,Eq,Debug)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cases,
    Deaths,
}

impl Metric {

    pub fn label(&self) -> &'static str {
	match self {
	    Self::Cases => "Total Cases",
	    Self::Deaths => "Total Deaths",
	}
    }

    pub fn field(&self) -> &'static str {
	match self {
	    Self::Cases => "cases",
	    Self::Deaths => "deaths",
	}
    }

}


pub struct Slider {
    pub name: &'static str,
    pub min: usize,
    pub max: usize,
    pub default: usize,
}

impl Slider {

    pub fn check(&self, val: usize) -> Result<usize> {
	match (self.min..=self.max).contains(&val) {
	    true => Ok(val),
	    false => Err(Error::OutOfRange(self.name, val, (self.min, self.max))),
	}
    }

}

pub const STATE_COUNT: Slider = Slider { name: "number of states", min: 1, max: 50, default: 10 };
pub const SUMMARY_DAYS: Slider = Slider { name: "summary days", min: 3, max: 20, default: 7 };
pub const AVERAGE_WINDOW: Slider = Slider { name: "moving average window", min: 5, max: 20, default: 7 };


/// Widget values for one render pass.
#[derive(Serialize,Clone,PartialEq,Debug)]
pub struct Selection {
    pub state: String,
    pub county: String,
    pub metric: Metric,
    pub state_count: usize,
    pub summary_days: usize,
    pub window: usize,
}

impl Selection {

    pub fn new(state: &str, county: &str, metric: Metric, state_count: usize,
	       summary_days: usize, window: usize) -> Result<Self> {
	Ok(Selection {
	    state: state.to_string(),
	    county: county.to_string(),
	    metric,
	    state_count: STATE_COUNT.check(state_count)?,
	    summary_days: SUMMARY_DAYS.check(summary_days)?,
	    window: AVERAGE_WINDOW.check(window)?,
	})
    }

    /// Fill in the state and county a fresh selector would show: the first
    /// entry of the respective index. Either may stay empty when the
    /// snapshot has nothing to offer.
    pub fn with_defaults(data: &Dataset, state: Option<&str>, county: Option<&str>,
			 metric: Metric, state_count: usize, summary_days: usize,
			 window: usize) -> Result<Self> {
	let state = match state {
	    Some(state) => state.to_string(),
	    None => data.states().into_iter().next().unwrap_or_default(),
	};
	let county = match county {
	    Some(county) => county.to_string(),
	    None => data.counties(&state).into_iter().next().unwrap_or_default(),
	};
	Self::new(&state, &county, metric, state_count, summary_days, window)
    }

}
