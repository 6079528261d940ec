//! Shared test harness modules for the WindBreaks CLI.

use super::*;

mod helpers;
