//! The presentation seam.
//!
//! Front ends implement `CountryPresenter` once and are handed to whatever
//! shows country data; the choice of implementation is made when the
//! application is wired together.

use std::io::{self, Write};

use crate::models::GlobalStats;
use crate::store::Loaded;

pub trait CountryPresenter: Send + Sync {
    /// Show one country, including why it is a placeholder if it is one
    fn present_country(&self, loaded: &Loaded, out: &mut dyn Write) -> io::Result<()>;

    /// Show totals and the per-country ranking
    fn present_global(&self, stats: &GlobalStats, out: &mut dyn Write) -> io::Result<()>;
}
