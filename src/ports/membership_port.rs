//! Index membership source port.

use crate::domain::error::FetchResult;
use crate::domain::universe::{RawTable, Universe};

pub trait MembershipPort {
    /// Every table found on the universe's membership page. The schema is not
    /// stable; column detection happens in [`crate::domain::universe::extract_members`].
    fn tables(&self, universe: Universe) -> FetchResult<Vec<RawTable>>;
}
