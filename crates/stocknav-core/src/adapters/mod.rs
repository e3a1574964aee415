//! Market-data adapters implementing [`DataSource`](crate::DataSource).
//!
//! | Adapter | Provider | Notes |
//! |---------|----------|-------|
//! | [`YahooAdapter`] | `yahoo` | Chart API, or deterministic synthetic bars |
//! | [`CsvDirAdapter`] | `csv` | One Yahoo-format CSV export per ticker |

mod csv_dir;
mod yahoo;

pub use csv_dir::CsvDirAdapter;
pub use yahoo::{YahooAdapter, YahooMode};
