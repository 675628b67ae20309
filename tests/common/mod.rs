#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use dom_compat::{Compat, Event, HostProfile, Target};

pub const PAGE: &str = r#"<!DOCTYPE html>
<html>
    <body>
        <div id="outer">
            <p id="panel"><span id="first">a</span><span id="second">b</span></p>
            <button id="button">Go</button>
        </div>
        <p id="elsewhere">c</p>
    </body>
</html>"#;

pub fn standard() -> Compat {
    dom_compat::logging::init_for_tests();
    Compat::from_html(HostProfile::standard(), PAGE).expect("standard host")
}

pub fn legacy() -> Compat {
    dom_compat::logging::init_for_tests();
    Compat::from_html(HostProfile::legacy(), PAGE).expect("legacy host")
}

pub fn element(compat: &Compat, id: &str) -> Target {
    compat
        .document()
        .get_element_by_id(id)
        .unwrap_or_else(|| panic!("missing #{id}"))
}

/// Shared log handlers push into.
pub type Seen = Rc<RefCell<Vec<Event>>>;

pub fn seen() -> Seen {
    Rc::new(RefCell::new(Vec::new()))
}
