use std::fmt;
use std::str::FromStr;

/// The closed set of algorithms the execution service knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    CandidateElimination,
    FindS,
    Id3,
}

impl AlgorithmId {
    /// Presentation order for pickers and listings.
    pub const ALL: [AlgorithmId; 3] = [
        AlgorithmId::CandidateElimination,
        AlgorithmId::FindS,
        AlgorithmId::Id3,
    ];

    /// Short tag accepted on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            AlgorithmId::CandidateElimination => "candidate-elimination",
            AlgorithmId::FindS => "find-s",
            AlgorithmId::Id3 => "id3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlgorithmId::CandidateElimination => "Candidate-Elimination algorithm",
            AlgorithmId::FindS => "FIND-S",
            AlgorithmId::Id3 => "ID3 algorithm",
        }
    }

    /// Value sent in the `selectedCode` form part.
    pub fn wire_value(self) -> &'static str {
        match self {
            AlgorithmId::CandidateElimination => "candidate-elimination",
            AlgorithmId::FindS => "FIND-S",
            AlgorithmId::Id3 => "ID3_algorithm",
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown algorithm '{}' (expected one of: candidate-elimination, find-s, id3)",
            self.0
        )
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for AlgorithmId {
    type Err = UnknownAlgorithm;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        AlgorithmId::ALL
            .into_iter()
            .find(|id| {
                normalized == id.tag() || normalized == id.wire_value().to_ascii_lowercase()
            })
            .ok_or_else(|| UnknownAlgorithm(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::AlgorithmId;

    #[test]
    fn parses_tags_and_wire_values_case_insensitively() {
        assert_eq!("find-s".parse(), Ok(AlgorithmId::FindS));
        assert_eq!("FIND-S".parse(), Ok(AlgorithmId::FindS));
        assert_eq!(" id3 ".parse(), Ok(AlgorithmId::Id3));
        assert_eq!("ID3_algorithm".parse(), Ok(AlgorithmId::Id3));
        assert_eq!(
            "Candidate-Elimination".parse(),
            Ok(AlgorithmId::CandidateElimination)
        );
    }

    #[test]
    fn rejects_values_outside_the_closed_set() {
        let err = "c4.5".parse::<AlgorithmId>().unwrap_err();
        assert_eq!(err.0, "c4.5");
        assert!(err.to_string().contains("find-s"));
    }

    #[test]
    fn wire_values_match_service_contract() {
        let wire: Vec<_> = AlgorithmId::ALL.iter().map(|id| id.wire_value()).collect();
        assert_eq!(wire, vec!["candidate-elimination", "FIND-S", "ID3_algorithm"]);
    }
}
