//! The `doctest` command: print a calculated worksheet as doctest input.

use super::{calculate_all, open_worksheet};
use crate::options::SheetOptions;

pub fn doctest_file(options: &SheetOptions) {
    let mut sheet = open_worksheet(options);
    calculate_all(&mut sheet);
    print!("{}", sheet.doctests(0, sheet.source_line_count()));
}
