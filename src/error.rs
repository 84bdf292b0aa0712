use std::{io,num,fmt};
use std::convert::From;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    IO(io::Error),
    CSV(csv::Error),
    JSON(serde_json::Error),
    Reqwest(reqwest::Error),
    HttpError(reqwest::StatusCode),
    ParseInt(num::ParseIntError),
    ParseDate(chrono::format::ParseError),
    MissingColumn(&'static str),
    OutOfRange(&'static str, usize, (usize,usize)),
    NoData(String),
}

/// Coarse classification used to decide how a failed pass is reported.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum ErrorKind {
    Fetch,
    Parse,
    Selection,
    IO,
}

impl Error {

    pub fn kind(&self) -> ErrorKind {
	match self {
	    Self::Reqwest(_) | Self::HttpError(_) => ErrorKind::Fetch,
	    Self::CSV(_) | Self::JSON(_) | Self::ParseInt(_)
		| Self::ParseDate(_) | Self::MissingColumn(_) => ErrorKind::Parse,
	    Self::OutOfRange(..) | Self::NoData(_) => ErrorKind::Selection,
	    Self::IO(_) => ErrorKind::IO,
	}
    }

}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
	Self::IO(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
	Self::CSV(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
	Self::JSON(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
	Self::Reqwest(err)
    }
}

impl From<num::ParseIntError> for Error {
    fn from(err: num::ParseIntError) -> Self {
	Self::ParseInt(err)
    }
}

impl From<chrono::format::ParseError> for Error {
    fn from(err: chrono::format::ParseError) -> Self {
	Self::ParseDate(err)
    }
}


impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match self {
	    Self::IO(err) => write!(f, "I/O error: {}", err),
	    Self::CSV(err) => write!(f, "CSV error: {}", err),
	    Self::JSON(err) => write!(f, "JSON error: {}", err),
            Self::Reqwest(err) => write!(f, "Request error: {}", err),
	    Self::HttpError(err) => write!(f, "HTTP error: {}", err),
	    Self::ParseInt(err) => write!(f, "Integer parse error: {}", err),
	    Self::ParseDate(err) => write!(f, "Date parse error: {}", err),
	    Self::MissingColumn(name) => write!(f, "Missing column: {}", name),
	    Self::OutOfRange(name, val, (min,max)) =>
		write!(f, "{} must be between {} and {} (got {})", name, min, max, val),
	    Self::NoData(what) => write!(f, "No data for {}", what),
	}
    }
}

impl std::error::Error for Error {}
