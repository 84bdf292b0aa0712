use std::{io,fs};
use std::fs::File;
use std::io::Write;
use std::path::{Path,PathBuf};

use chrono::naive::NaiveDate;
use serde_json::{Value,json};
use unidecode::unidecode;

use super::aggregate::{RegionTotals,SeriesRow};
use super::error::Result;
use super::present::{Dashboard,CountyView};
use super::selection::Metric;


pub type Series = Vec<(NaiveDate,f64)>;

/// Page name used when no county is selected. Slugs never start with `_`.
const STATE_PAGE: &str = "_state";


/// Location of the dashboard page for the current selection.
pub fn page_path(graph_path: &Path, dash: &Dashboard) -> PathBuf {
    let page = match dash.selection.county.as_str() {
	"" => STATE_PAGE.to_string(),
	county => slug(county),
    };
    graph_path.join(slug(&dash.selection.state)).join(format!("{}.html", page))
}

pub fn dashboard(graph_path: &Path, dash: &Dashboard) -> Result<PathBuf> {
    let path = page_path(graph_path, dash);
    if let Some(dir) = path.parent() {
	fs::create_dir_all(dir)?;
    }
    let mut out = io::BufWriter::new(File::create(&path)?);
    page(&mut out, dash)?;
    out.flush()?;
    Ok(path)
}

/// Chart-ready tables next to the page, for other front ends.
pub fn tables(graph_path: &Path, dash: &Dashboard) -> Result<PathBuf> {
    let path = page_path(graph_path, dash).with_extension("json");
    if let Some(dir) = path.parent() {
	fs::create_dir_all(dir)?;
    }
    serde_json::to_writer_pretty(io::BufWriter::new(File::create(&path)?), dash)?;
    Ok(path)
}


pub fn page<W: Write>(out: &mut W, dash: &Dashboard) -> Result<()> {

    let sel = &dash.selection;
    let mut views = vec![
	("scatter", scatter_spec(&dash.scatter)),
	("bar", bar_spec(sel.metric, &dash.bar)),
    ];

    write!(out, "<!DOCTYPE html><html><head>")?;
    write!(out, "<meta charset=\"UTF-8\">")?;
    write!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")?;
    write!(out, "<title>USA Covid-19 Dashboard</title>")?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega@5\"></script>")?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega-lite@4\"></script>")?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega-embed\"></script>")?;
    write!(out, "<style>table{{border-collapse:collapse}}td,th{{border:1px solid #ccc;padding:2px 8px;text-align:right}}</style>")?;
    write!(out, "</head>")?;
    write!(out, "<body>")?;

    write!(out, "<h1>USA Covid-19 Dashboard</h1>")?;
    write!(out, "<p>Number of daily covid-19 cases, death counts and the moving average \
		 for every state and county in the United States")?;
    if let Some(date) = dash.as_of {
	write!(out, " (data up to {})", date.format("%Y-%m-%d"))?;
    }
    write!(out, ".</p>")?;

    write!(out, "<h2>Total number of cases vs Total number of deaths for {} states</h2>",
	   sel.state_count)?;
    write!(out, "<div id=\"scatter\"></div>")?;

    write!(out, "<h2>Top {} states with highest number of covid-19 {}</h2>", sel.state_count,
	   match sel.metric { Metric::Cases => "cases", Metric::Deaths => "deaths" })?;
    write!(out, "<div id=\"bar\"></div>")?;

    match &dash.county {
	Some(county) => {
	    write!(out, "<h2>Summary Table for the last {} days for {} county</h2>",
		   sel.summary_days, escape(&sel.county))?;
	    summary_table(out, &county.summary)?;
	    write!(out, "<h2>Total Cases for {}, {}.</h2>", escape(&sel.county), escape(&sel.state))?;
	    write!(out, "<div id=\"cases\"></div>")?;
	    write!(out, "<h2>{} day moving average for {}, {}.</h2>", sel.window,
		   escape(&sel.county), escape(&sel.state))?;
	    write!(out, "<div id=\"average\"></div>")?;
	    views.extend(county_specs(sel.window, county));
	}
	None => {
	    let place = match sel.county.as_str() {
		"" => sel.state.clone(),
		county => format!("{}, {}", county, sel.state),
	    };
	    write!(out, "<h2>No data for {}.</h2>", escape(&place))?;
	}
    }

    write!(out, "<script type=\"text/javascript\">")?;
    for (id,spec) in views {
	write!(out, "vegaEmbed('#{}', ", id)?;
	serde_json::to_writer(out.by_ref(), &spec)?;
	write!(out, ",{{}}).catch(console.error);")?;
    }
    write!(out, "</script>")?;
    write!(out, "</body></html>")?;

    Ok(())

}


fn scatter_spec(data: &[RegionTotals]) -> Value {
    json!({
	"$schema": "https://vega.github.io/schema/vega-lite/v4.json",
	"width": 600,
	"height": 400,
	"data": { "values": data },
	"mark": { "type": "circle", "tooltip": {"content": "data"} },
	"encoding": {
	    "x": { "field": "cases", "title": "Total Cases", "type": "quantitative" },
	    "y": { "field": "deaths", "title": "Total Deaths", "type": "quantitative" },
	    "color": { "field": "state", "title": "State", "type": "nominal" },
	    "size": { "field": "cases", "type": "quantitative", "legend": null }
	}
    })
}

fn bar_spec(metric: Metric, data: &[RegionTotals]) -> Value {
    json!({
	"$schema": "https://vega.github.io/schema/vega-lite/v4.json",
	"width": 600,
	"height": 400,
	"data": { "values": data },
	"mark": { "type": "bar", "tooltip": {"content": "data"} },
	"encoding": {
	    "x": {
		"field": "state",
		"title": "State",
		"type": "nominal",
		"sort": data.iter().map(|t| t.state.as_str()).collect::<Vec<_>>()
	    },
	    "y": { "field": metric.field(), "title": metric.label(), "type": "quantitative" },
	    "color": { "field": "state", "type": "nominal", "legend": null }
	}
    })
}

fn county_specs(window: usize, view: &CountyView) -> Vec<(&'static str,Value)> {
    vec![
	("cases", line_spec("Total Cases", &view.cases)),
	("average", line_spec(&format!("{}-day average of new cases", window),
			      &view.moving_average)),
    ]
}

fn line_spec(ytitle: &str, series: &Series) -> Value {
    json!({
	"$schema": "https://vega.github.io/schema/vega-lite/v4.json",
	"width": 600,
	"height": 300,
	"data": {
	    "values": series.iter().filter_map(
		|(date,val)| match val.is_finite() {
		    false => None,
		    true => Some(json!({
			"Date": format!("{}", date.format("%Y-%m-%d")),
			"Value": val
		    }))
		}
	    ).collect::<Vec<_>>()
	},
	"layer": [
	    {
		"encoding": {
		    "x": {
			"field":"Date",
			"timeUnit": "utcyearmonthdate",
			"title":"Date",
			"type":"temporal"
		    },
		    "y": {
			"field":"Value",
			"title": ytitle,
			"type":"quantitative"
		    }
		},
		"layer": [
		    {
			"mark":"line",
			"selection": {
			    "Grid": {"bind":"scales","type":"interval"}
			}
		    },
		    {
			"mark":"point",
			"encoding": {
			    "opacity": {
				"value":0,
				"condition": {"value":1,"selection":"Hover"}
			    }
			}
		    }
		]
	    },
	    {
		"mark": {
		    "color": "gray",
		    "tooltip": {"content":"data"},
		    "type": "rule"
		},
		"selection": {
		    "Hover": {
			"nearest":true,
			"empty":"none",
			"clear":"mouseout",
			"type":"single",
			"on":"mouseover",
			"fields":["Date"]
		    }
		},
		"encoding": {
		    "opacity": {
			"value": 0,
			"condition": {
			    "value": 1,
			    "selection": "Hover"
			}
		    },
		    "x": {
			"field":"Date",
			"type":"temporal"
		    }
		}
	    }
	]
    })
}


fn summary_table<W: Write>(out: &mut W, rows: &[SeriesRow]) -> Result<()> {
    write!(out, "<table><tr><th>Date</th><th>Total Cases</th><th>Total Deaths</th>\
		 <th>New Cases</th><th>Moving Average</th></tr>")?;
    for row in rows {
	write!(out, "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
	       row.date.format("%Y-%m-%d"), or_dash(row.cases), or_dash(row.deaths),
	       or_dash(row.new_cases),
	       row.moving_average.map_or("-".to_string(), |a| format!("{:.3}", a)))?;
    }
    write!(out, "</table>")?;
    Ok(())
}

fn or_dash<T: ToString>(val: Option<T>) -> String {
    val.map_or("-".to_string(), |v| v.to_string())
}


fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// ASCII file name component for a state or county name.
fn slug(name: &str) -> String {
    unidecode(name).to_lowercase()
	.split(|c: char| !c.is_ascii_alphanumeric())
	.filter(|part| !part.is_empty())
	.collect::<Vec<_>>()
	.join("-")
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::dataset::tests::sample;
    use crate::selection::Selection;

    fn render(state: &str, county: &str) -> (Dashboard,String) {
	let sel = Selection::new(state, county, Metric::Cases, 10, 7, 5).unwrap();
	let dash = Dashboard::build(&sample(), &sel);
	let mut out = Vec::new();
	page(&mut out, &dash).unwrap();
	(dash, String::from_utf8(out).unwrap())
    }

    #[test]
    fn slugs() {
	assert_eq!(slug("Doña Ana"), "dona-ana");
	assert_eq!(slug("St. Mary's"), "st-mary-s");
	assert_eq!(slug("New York City"), "new-york-city");
    }

    #[test]
    fn page_with_county() {
	let (dash,html) = render("California", "Alpha");
	assert!(html.contains("Summary Table for the last 7 days for Alpha county"));
	assert!(html.contains("Top 10 states with highest number of covid-19 cases"));
	assert!(html.contains("vegaEmbed('#average'"));
	assert!(html.contains("<td>2020-03-04</td><td>15</td><td>1</td><td>3</td><td>-</td>"));
	assert_eq!(page_path(Path::new("graphs"), &dash),
		   PathBuf::from("graphs/california/alpha.html"));
    }

    #[test]
    fn page_without_county() {
	let (dash,html) = render("Puerto Rico", "");
	assert!(html.contains("<h2>No data for Puerto Rico.</h2>"));
	assert!(!html.contains("vegaEmbed('#cases'"));
	assert!(html.contains("vegaEmbed('#bar'"));
	assert_eq!(page_path(Path::new("graphs"), &dash),
		   PathBuf::from("graphs/puerto-rico/_state.html"));
    }

    #[test]
    fn county_named_state_keeps_its_own_page() {
	let (dash,_) = render("Puerto Rico", "State");
	assert_eq!(page_path(Path::new("graphs"), &dash),
		   PathBuf::from("graphs/puerto-rico/state.html"));
    }

    #[test]
    fn blank_counts_show_a_dash() {
	let rows = vec![SeriesRow {
	    date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
	    cases: Some(40),
	    deaths: None,
	    new_cases: None,
	    moving_average: None,
	}];
	let mut out = Vec::new();
	summary_table(&mut out, &rows).unwrap();
	assert!(String::from_utf8(out).unwrap()
		.contains("<td>2021-03-01</td><td>40</td><td>-</td><td>-</td><td>-</td>"));
    }

    #[test]
    fn line_chart_has_one_series() {
	let series = vec![(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(), 1.5),
			  (NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(), f64::NAN)];
	let spec = line_spec("Total Cases", &series);
	let values = spec["data"]["values"].as_array().unwrap();
	assert_eq!(values.len(), 1);
	assert_eq!(values[0], json!({"Date": "2020-03-01", "Value": 1.5}));
	assert!(spec["layer"][0]["encoding"].get("color").is_none());
    }

    #[test]
    fn rendering_is_deterministic() {
	assert_eq!(render("California", "Beta").1, render("California", "Beta").1);
    }

    #[test]
    fn writes_page_and_tables() {
	let dir = tempfile::tempdir().unwrap();
	let (dash,_) = render("California", "Beta");
	let html = dashboard(dir.path(), &dash).unwrap();
	let json = tables(dir.path(), &dash).unwrap();
	assert!(html.ends_with("california/beta.html"));
	let value : Value = serde_json::from_reader(File::open(json).unwrap()).unwrap();
	assert_eq!(value["bar"][0]["state"], "CA");
	assert_eq!(value["county"]["summary"].as_array().unwrap().len(), 4);
    }

}
