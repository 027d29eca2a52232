//! Static label tables shipped with the engine.
//!
//! Records carry terse codes (`Lu`, `6.0`, `E2.0`); clients display the
//! labels below.

/// Label for a two-letter general category
pub fn general_category_label(code: &str) -> Option<&'static str> {
    let label = match code {
        "Cc" => "Control",
        "Cf" => "Format",
        "Cn" => "Unassigned",
        "Co" => "Private Use",
        "Cs" => "Surrogate",
        "Ll" => "Lowercase Letter",
        "Lm" => "Modifier Letter",
        "Lo" => "Other Letter",
        "Lt" => "Titlecase Letter",
        "Lu" => "Uppercase Letter",
        "Mc" => "Spacing Mark",
        "Me" => "Enclosing Mark",
        "Mn" => "Nonspacing Mark",
        "Nd" => "Decimal Number",
        "Nl" => "Letter Number",
        "No" => "Other Number",
        "Pc" => "Connector Punctuation",
        "Pd" => "Dash Punctuation",
        "Pe" => "Close Punctuation",
        "Pf" => "Final Punctuation",
        "Pi" => "Initial Punctuation",
        "Po" => "Other Punctuation",
        "Ps" => "Open Punctuation",
        "Sc" => "Currency Symbol",
        "Sk" => "Modifier Symbol",
        "Sm" => "Math Symbol",
        "So" => "Other Symbol",
        "Zl" => "Line Separator",
        "Zp" => "Paragraph Separator",
        "Zs" => "Space Separator",
        _ => return None,
    };
    Some(label)
}

/// Label for a Unicode (`6.0`) or Emoji (`E2.0`) version tag
pub fn age_label(age: &str) -> Option<&'static str> {
    let label = match age {
        "1.1" => "Unicode 1.1 (1993)",
        "2.0" => "Unicode 2.0 (1996)",
        "2.1" => "Unicode 2.1 (1998)",
        "3.0" => "Unicode 3.0 (1999)",
        "3.1" => "Unicode 3.1 (2001)",
        "3.2" => "Unicode 3.2 (2002)",
        "4.0" => "Unicode 4.0 (2003)",
        "4.1" => "Unicode 4.1 (2005)",
        "5.0" => "Unicode 5.0 (2006)",
        "5.1" => "Unicode 5.1 (2008)",
        "5.2" => "Unicode 5.2 (2009)",
        "6.0" => "Unicode 6.0 (2010)",
        "6.1" => "Unicode 6.1 (2012)",
        "6.2" => "Unicode 6.2 (2012)",
        "6.3" => "Unicode 6.3 (2013)",
        "7.0" => "Unicode 7.0 (2014)",
        "8.0" => "Unicode 8.0 (2015)",
        "9.0" => "Unicode 9.0 (2016)",
        "10.0" => "Unicode 10.0 (2017)",
        "11.0" => "Unicode 11.0 (2018)",
        "12.0" => "Unicode 12.0 (2019)",
        "12.1" => "Unicode 12.1 (2019)",
        "13.0" => "Unicode 13.0 (2020)",
        "14.0" => "Unicode 14.0 (2021)",
        "15.0" => "Unicode 15.0 (2022)",
        "15.1" => "Unicode 15.1 (2023)",
        "16.0" => "Unicode 16.0 (2024)",
        "E0.6" => "Emoji 0.6 (2010)",
        "E0.7" => "Emoji 0.7 (2015)",
        "E1.0" => "Emoji 1.0 (2015)",
        "E2.0" => "Emoji 2.0 (2015)",
        "E3.0" => "Emoji 3.0 (2016)",
        "E4.0" => "Emoji 4.0 (2016)",
        "E5.0" => "Emoji 5.0 (2017)",
        "E11.0" => "Emoji 11.0 (2018)",
        "E12.0" => "Emoji 12.0 (2019)",
        "E12.1" => "Emoji 12.1 (2019)",
        "E13.0" => "Emoji 13.0 (2020)",
        "E13.1" => "Emoji 13.1 (2020)",
        "E14.0" => "Emoji 14.0 (2021)",
        "E15.0" => "Emoji 15.0 (2022)",
        "E15.1" => "Emoji 15.1 (2023)",
        "E16.0" => "Emoji 16.0 (2024)",
        _ => return None,
    };
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(general_category_label("Lu"), Some("Uppercase Letter"));
        assert_eq!(general_category_label("Cn"), Some("Unassigned"));
        assert_eq!(general_category_label("XX"), None);

        assert_eq!(age_label("1.1"), Some("Unicode 1.1 (1993)"));
        assert_eq!(age_label("E2.0"), Some("Emoji 2.0 (2015)"));
        assert_eq!(age_label("0.5"), None);
    }
}
