//! Hand-rolled synchronization primitives: a pthread mutex, a pthread
//! condition variable, and a counting semaphore built from the two.

use anyhow::bail;
use libc::c_int;

mod condvar;
mod mutex;
mod semaphore;

pub use condvar::*;
pub use mutex::*;
pub use semaphore::*;

pub trait CheckOk<R> {
    fn r(self, op: &str) -> Result<R, anyhow::Error>;
}

impl CheckOk<()> for c_int {
    fn r(self, op: &str) -> Result<(), anyhow::Error> {
        if self != 0 {
            bail!("Operation {op} failed: Code {self}");
        }
        Ok(())
    }
}
