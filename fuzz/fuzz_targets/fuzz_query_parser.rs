#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Any input either parses or is rejected as an invalid query
    if let Ok(query) = unidex::query::parse_query(data) {
        let _ = query.match_name("LATIN SMALL LETTER A");
        let _ = query.latex_loose("\\alpha");
    }
    let _ = unidex::query::parser::latex_spellings(data);
});
