pub mod blast;
pub mod config;
pub mod errors;
pub mod runner;
pub mod seq;

use crate::errors::SigBlastError;

pub fn run() -> Result<(), SigBlastError> {
    runner::run()
}
