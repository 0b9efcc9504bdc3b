use crate::generation::patterns::CANNED_RESPONSES;

/// The fixed acknowledgement list attached to every generated intent.
pub fn default_responses() -> Vec<String> {
    CANNED_RESPONSES.iter().map(|response| response.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::default_responses;

    #[test]
    fn responses_are_static() {
        assert_eq!(default_responses(), default_responses());
        assert_eq!(default_responses().len(), 4);
    }
}
