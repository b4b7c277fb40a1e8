pub mod coingecko;
pub mod newsapi;
pub mod util;
