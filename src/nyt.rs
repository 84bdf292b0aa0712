use std::fs;
use std::fs::File;
use std::path::{Path,PathBuf};
use std::time::Duration;

use encoding_rs::UTF_8;
use tracing::{info,warn,debug};

use super::dataset::Dataset;
use super::error::{Result,Error};


pub const URL: &str = "https://raw.githubusercontent.com/nytimes/covid-19-data/master/us-counties.csv";


/// Fetches the New York Times county snapshot, keeping the raw CSV in
/// `cache_path` for `max_age`.
pub struct Loader {
    pub url: String,
    pub cache_path: PathBuf,
    pub max_age: Duration,
    pub timeout: Duration,
    pub refresh: bool,
}

impl Loader {

    pub fn counties(&self) -> Result<Dataset> {

	let cache_path = self.cache_path.join("nyt");
	let cache_file = cache_path.join("us-counties.csv");

	if !self.refresh && is_fresh(&cache_file, self.max_age)? {
	    match File::open(&cache_file).map_err(Error::from).and_then(Dataset::from_reader) {
		Ok(data) => {
		    debug!("Using cached {}", cache_file.display());
		    return Ok(data);
		}
		Err(err) => warn!("Ignoring unreadable cache {}: {}", cache_file.display(), err),
	    }
	}

	let body = self.download()?;
	let data = Dataset::from_reader(body.as_bytes())?;
	fs::create_dir_all(&cache_path)?;
	fs::write(&cache_file, &body)?;
	Ok(data)

    }

    fn download(&self) -> Result<String> {
	let client = reqwest::blocking::Client::builder()
	    .timeout(self.timeout)
	    .build()?;
	match self.fetch(&client) {
	    Ok(body) => Ok(body),
	    Err(err) => {
		warn!("Download of {} failed ({}), retrying once", self.url, err);
		self.fetch(&client)
	    }
	}
    }

    fn fetch(&self, client: &reqwest::blocking::Client) -> Result<String> {
	info!("Downloading {}...", self.url);
	let res = client.get(&self.url).send()?;
	match res.status().is_success() {
	    true => Ok(decode(&res.bytes()?)),
	    false => Err(Error::HttpError(res.status())),
	}
    }

}


/// A modification time in the future counts as stale.
fn is_fresh(cache_file: &Path, max_age: Duration) -> Result<bool> {
    Ok(cache_file.exists() && fs::metadata(cache_file)?.modified()?.elapsed()
       .map_or(false, |age| age < max_age))
}

fn decode(bytes: &[u8]) -> String {
    UTF_8.decode_with_bom_removal(bytes).0.into_owned()
}
