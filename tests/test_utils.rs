use h2probe::types::ProbeError;
use h2probe::utils::parse_header_spec;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_pairs() {
        let headers = parse_header_spec("a=1,b=2").unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("a").unwrap(), "1");
        assert_eq!(headers.get("b").unwrap(), "2");

        let reversed = parse_header_spec("b=2,a=1").unwrap();
        assert_eq!(reversed.get("a"), Some("1"));
        assert_eq!(reversed.get("b"), Some("2"));
    }

    #[test]
    fn test_parse_empty_spec() {
        assert!(parse_header_spec("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_pseudo_header_prefix() {
        let headers = parse_header_spec(":authority=example.com,:path=/x").unwrap();
        assert_eq!(headers.get("authority").unwrap(), "example.com");
        assert_eq!(headers.get("path").unwrap(), "/x");
        assert!(headers.get(":authority").is_none());
    }

    #[test]
    fn test_parse_value_with_equals() {
        let headers = parse_header_spec("cookie=a=1").unwrap();
        assert_eq!(headers.get("cookie").unwrap(), "a=1");
    }

    #[test]
    fn test_parse_duplicate_last_wins() {
        let headers = parse_header_spec("x-a=1,x-a=2").unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-a").unwrap(), "2");
    }

    #[test]
    fn test_parse_duplicate_differing_case() {
        let headers = parse_header_spec("x-a=1,X-A=2").unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-a"), Some("2"));

        let headers = parse_header_spec("method=PUT,:METHOD=DELETE").unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("method"), Some("DELETE"));
    }

    #[test]
    fn test_parse_keeps_input_order() {
        let headers = parse_header_spec("z=1,a=2,m=3").unwrap();
        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parse_empty_value() {
        let headers = parse_header_spec("x-empty=").unwrap();
        assert_eq!(headers.get("x-empty").unwrap(), "");
    }

    #[test]
    fn test_parse_malformed_segments() {
        for spec in ["novalue", "a=1,", "a=1,,b=2", "=x", ":=x"] {
            let err = parse_header_spec(spec).unwrap_err();
            assert!(
                matches!(err, ProbeError::MalformedHeaders(_)),
                "spec {:?} gave {:?}",
                spec,
                err
            );
        }
    }
}
