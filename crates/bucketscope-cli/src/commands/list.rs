//! `list`: one folder level plus its scene table.

use bucketscope_core::navigation::Navigator;
use bucketscope_core::scenes::ColumnPolicy;

use crate::render;

pub fn run(navigator: &Navigator, columns: ColumnPolicy) {
    print!("{}", page(navigator, columns));
}

/// Everything shown for the current location.
pub(super) fn page(navigator: &Navigator, columns: ColumnPolicy) -> String {
    let mut out = String::new();

    if let Some(context) = navigator.context() {
        out.push_str(&render::breadcrumb_line(&context.bucket, &context.path));
        out.push('\n');
    }
    if let Some(status) = render::navigation_state(navigator.state()) {
        out.push_str(&status);
        out.push('\n');
        return out;
    }

    out.push_str(&render::listing(navigator.listing()));
    out.push_str(&render::scene_table(navigator.scenes(), columns));
    out
}
