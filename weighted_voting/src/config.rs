// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// A member of the assembly, with the number of votes it carries.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Voter {
    pub name: String,
    /// The vote multiplier. Weights are summed, never split.
    pub weight: u64,
}

impl Voter {
    pub fn new(name: &str, weight: u64) -> Voter {
        Voter {
            name: name.to_string(),
            weight,
        }
    }
}

/// The fraction of the counted weight that must be exceeded for a
/// value to be accepted.
///
/// The fraction is kept exact (always reduced) so that the required weight
/// does not depend on floating point rounding: `floor(100 * 0.29)` is 29.
///
/// ```
/// use weighted_voting::Threshold;
///
/// let t: Threshold = "0.75".parse()?;
/// assert_eq!(t.required_weight(10), 7);
/// assert_eq!(t.to_string(), "0.75");
///
/// let two_thirds: Threshold = "2/3".parse()?;
/// assert_eq!(two_thirds.required_weight(10), 6);
/// # Ok::<(), weighted_voting::ThresholdError>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct Threshold {
    numerator: u64,
    denominator: u64,
}

impl Threshold {
    /// A simple majority.
    pub const HALF: Threshold = Threshold {
        numerator: 1,
        denominator: 2,
    };

    pub fn new(numerator: u64, denominator: u64) -> Result<Threshold, ThresholdError> {
        if denominator == 0 {
            return Err(ThresholdError::ZeroDenominator);
        }
        if numerator > denominator {
            return Err(ThresholdError::OutOfRange(format!(
                "{}/{}",
                numerator, denominator
            )));
        }
        let g = gcd(numerator, denominator);
        Ok(Threshold {
            numerator: numerator / g,
            denominator: denominator / g,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// `floor(total_weight * threshold)`, computed without rounding errors.
    pub fn required_weight(&self, total_weight: u64) -> u64 {
        let w = (total_weight as u128) * (self.numerator as u128) / (self.denominator as u128);
        // The threshold is at most 1, so the result always fits.
        w as u64
    }

    fn parse_decimal(s: &str) -> Result<Threshold, ThresholdError> {
        let invalid = || ThresholdError::Invalid(s.to_string());
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(invalid());
        }
        if frac_part.len() > MAX_DECIMALS {
            return Err(invalid());
        }
        let int_value: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let frac_value: u64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| invalid())?
        };
        let denominator = 10u64.pow(frac_part.len() as u32);
        let numerator = int_value
            .checked_mul(denominator)
            .and_then(|x| x.checked_add(frac_value))
            .ok_or_else(|| ThresholdError::OutOfRange(s.to_string()))?;
        Threshold::new(numerator, denominator).map_err(|e| match e {
            ThresholdError::OutOfRange(_) => ThresholdError::OutOfRange(s.to_string()),
            other => other,
        })
    }
}

// 10^18 still fits in a u64.
const MAX_DECIMALS: usize = 18;

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

impl FromStr for Threshold {
    type Err = ThresholdError;

    /// Accepts decimal text (`0.5`, `.75`, `1`) or a fraction (`2/3`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((num, den)) = s.split_once('/') {
            let num: u64 = num
                .trim()
                .parse()
                .map_err(|_| ThresholdError::Invalid(s.to_string()))?;
            let den: u64 = den
                .trim()
                .parse()
                .map_err(|_| ThresholdError::Invalid(s.to_string()))?;
            return Threshold::new(num, den);
        }
        Threshold::parse_decimal(s)
    }
}

impl Display for Threshold {
    /// Decimal text whenever the fraction has a finite decimal expansion.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for k in 0..=MAX_DECIMALS as u32 {
            let scale = 10u64.pow(k);
            if scale % self.denominator != 0 {
                continue;
            }
            let scaled = self.numerator * (scale / self.denominator);
            if k == 0 {
                return write!(f, "{}", scaled);
            }
            return write!(
                f,
                "{}.{:0width$}",
                scaled / scale,
                scaled % scale,
                width = k as usize
            );
        }
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A poll deciding on an amount of money: the accepted amount is the
/// weighted median of the proposed amounts.
#[derive(PartialEq, Debug, Clone)]
pub struct MedianPoll {
    pub name: String,
    pub threshold: Threshold,
    /// If true, voters without a ballot are counted as proposing 0.
    pub count_abstentions: bool,
    /// The ceiling amount being voted on. Only informational.
    pub max_value: f64,
}

/// A poll ranking a fixed list of options with the Schulze method.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct SchulzePoll {
    pub name: String,
    pub threshold: Threshold,
    /// If true, voters without a ballot are counted as voting for the
    /// reject option (see `reject_option`).
    pub count_abstentions: bool,
    pub options: Vec<String>,
}

impl SchulzePoll {
    /// The option standing for "no". By convention this is always the last option.
    ///
    /// The position is a fixed rule and is never inferred from the option names.
    pub fn reject_option(&self) -> Option<usize> {
        self.options.len().checked_sub(1)
    }
}

/// The definition of a poll, without any of the votes cast.
#[derive(PartialEq, Debug, Clone)]
pub enum PollDefinition {
    Median(MedianPoll),
    Schulze(SchulzePoll),
}

impl PollDefinition {
    pub const MEDIAN_TAG: &'static str = "median";
    pub const SCHULZE_TAG: &'static str = "schulze";

    pub fn name(&self) -> &str {
        match self {
            PollDefinition::Median(p) => &p.name,
            PollDefinition::Schulze(p) => &p.name,
        }
    }

    pub fn threshold(&self) -> Threshold {
        match self {
            PollDefinition::Median(p) => p.threshold,
            PollDefinition::Schulze(p) => p.threshold,
        }
    }

    pub fn count_abstentions(&self) -> bool {
        match self {
            PollDefinition::Median(p) => p.count_abstentions,
            PollDefinition::Schulze(p) => p.count_abstentions,
        }
    }

    /// The discriminator used when the definition is persisted.
    pub fn tag(&self) -> &'static str {
        match self {
            PollDefinition::Median(_) => PollDefinition::MEDIAN_TAG,
            PollDefinition::Schulze(_) => PollDefinition::SCHULZE_TAG,
        }
    }
}

/// The ballot of one voter in a median poll.
#[derive(PartialEq, Debug, Clone)]
pub struct MedianBallot {
    pub voter: String,
    pub weight: u64,
    /// The proposed amount, `None` if the voter abstained.
    pub value: Option<f64>,
}

impl MedianBallot {
    pub fn new(voter: &str, weight: u64, value: Option<f64>) -> MedianBallot {
        MedianBallot {
            voter: voter.to_string(),
            weight,
            value,
        }
    }
}

/// The ballot of one voter in a Schulze poll.
///
/// The ranking holds one rank per option, in option order. A smaller rank
/// means a preferred option and equal ranks are ties. The length of the
/// ranking is checked against the poll at construction.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct SchulzeBallot {
    pub voter: String,
    pub weight: u64,
    ranking: Option<Vec<i64>>,
}

impl SchulzeBallot {
    pub fn new(
        voter: &str,
        weight: u64,
        ranking: Vec<i64>,
        poll: &SchulzePoll,
    ) -> Result<SchulzeBallot, BallotError> {
        if ranking.len() != poll.options.len() {
            return Err(BallotError::WrongRankingLength {
                poll: poll.name.clone(),
                voter: voter.to_string(),
                literal: ranking
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<String>>()
                    .join(" "),
                expected: poll.options.len(),
                found: ranking.len(),
            });
        }
        Ok(SchulzeBallot::unchecked(voter, weight, Some(ranking)))
    }

    pub fn abstained(voter: &str, weight: u64) -> SchulzeBallot {
        SchulzeBallot::unchecked(voter, weight, None)
    }

    pub(crate) fn unchecked(voter: &str, weight: u64, ranking: Option<Vec<i64>>) -> SchulzeBallot {
        SchulzeBallot {
            voter: voter.to_string(),
            weight,
            ranking,
        }
    }

    /// The ranks, `None` if the voter abstained.
    pub fn ranking(&self) -> Option<&[i64]> {
        self.ranking.as_deref()
    }
}

/// A single ballot, for either kind of poll.
#[derive(PartialEq, Debug, Clone)]
pub enum Ballot {
    Median(MedianBallot),
    Schulze(SchulzeBallot),
}

impl Ballot {
    pub fn voter(&self) -> &str {
        match self {
            Ballot::Median(b) => &b.voter,
            Ballot::Schulze(b) => &b.voter,
        }
    }
}

/// All the ballots cast in one poll.
#[derive(PartialEq, Debug, Clone)]
pub enum Ballots {
    Median(Vec<MedianBallot>),
    Schulze(Vec<SchulzeBallot>),
}

impl Ballots {
    pub fn len(&self) -> usize {
        match self {
            Ballots::Median(v) => v.len(),
            Ballots::Schulze(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Common view over both ballot kinds, used by the admission step.
pub(crate) trait WeightedBallot: Clone {
    fn weight(&self) -> u64;
    fn is_abstained(&self) -> bool;
}

impl WeightedBallot for MedianBallot {
    fn weight(&self) -> u64 {
        self.weight
    }
    fn is_abstained(&self) -> bool {
        self.value.is_none()
    }
}

impl WeightedBallot for SchulzeBallot {
    fn weight(&self) -> u64 {
        self.weight
    }
    fn is_abstained(&self) -> bool {
        self.ranking.is_none()
    }
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct MedianResult {
    /// The ballots taken into account, after the abstention policy.
    pub counted: Vec<MedianBallot>,
    pub total_weight: u64,
    pub required_weight: u64,
    /// `None` if no amount gathered more than the required weight.
    pub accepted_value: Option<f64>,
}

impl MedianResult {
    pub fn is_accepted(&self) -> bool {
        self.accepted_value.is_some()
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct SchulzeResult {
    /// The ballots taken into account, after the abstention policy.
    pub counted: Vec<SchulzeBallot>,
    pub total_weight: u64,
    pub required_weight: u64,
    /// `defeats[i][j]`: the weight of the voters strictly preferring i to j.
    pub defeats: Vec<Vec<u64>>,
    /// `strongest_paths[i][j]`: the strength of the widest beatpath from i to j.
    pub strongest_paths: Vec<Vec<u64>>,
    /// Option indices grouped by rank, best group first. Options inside a
    /// group are tied and listed in option order.
    pub ranked_groups: Vec<Vec<usize>>,
}

impl SchulzeResult {
    /// The options of the first group, empty if there are no options.
    pub fn winners(&self) -> &[usize] {
        self.ranked_groups.first().map(|g| g.as_slice()).unwrap_or(&[])
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum EvaluationResult {
    Median(MedianResult),
    Schulze(SchulzeResult),
}

impl EvaluationResult {
    pub fn total_weight(&self) -> u64 {
        match self {
            EvaluationResult::Median(r) => r.total_weight,
            EvaluationResult::Schulze(r) => r.total_weight,
        }
    }

    pub fn required_weight(&self) -> u64 {
        match self {
            EvaluationResult::Median(r) => r.required_weight,
            EvaluationResult::Schulze(r) => r.required_weight,
        }
    }
}

// ******** Errors *********

/// Errors when reading a majority threshold.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ThresholdError {
    Invalid(String),
    OutOfRange(String),
    ZeroDenominator,
}

impl Error for ThresholdError {}

impl Display for ThresholdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdError::Invalid(s) => write!(f, "{:?} is not a number", s),
            ThresholdError::OutOfRange(s) => {
                write!(f, "threshold {:?} is not between 0 and 1", s)
            }
            ThresholdError::ZeroDenominator => write!(f, "threshold with a zero denominator"),
        }
    }
}

/// Errors when turning raw input into a ballot.
///
/// They always carry the poll, the voter and the offending text.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BallotError {
    InvalidAmount {
        poll: String,
        voter: String,
        literal: String,
    },
    InvalidRank {
        poll: String,
        voter: String,
        literal: String,
    },
    WrongRankingLength {
        poll: String,
        voter: String,
        literal: String,
        expected: usize,
        found: usize,
    },
    /// A median ballot given to a Schulze poll, or the reverse.
    MismatchedBallot { poll: String, voter: String },
}

impl Error for BallotError {}

impl Display for BallotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BallotError::InvalidAmount {
                poll,
                voter,
                literal,
            } => write!(
                f,
                "poll {:?}, voter {:?}: {:?} is not an amount",
                poll, voter, literal
            ),
            BallotError::InvalidRank {
                poll,
                voter,
                literal,
            } => write!(
                f,
                "poll {:?}, voter {:?}: {:?} is not a ranking of integers",
                poll, voter, literal
            ),
            BallotError::WrongRankingLength {
                poll,
                voter,
                literal,
                expected,
                found,
            } => write!(
                f,
                "poll {:?}, voter {:?}: ranking {:?} has {} entries, expected one per option ({})",
                poll, voter, literal, found, expected
            ),
            BallotError::MismatchedBallot { poll, voter } => write!(
                f,
                "poll {:?}, voter {:?}: ballot does not match the kind of poll",
                poll, voter
            ),
        }
    }
}

/// Errors that prevent an evaluation from starting.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    /// The ballots are not of the kind expected by the poll.
    MismatchedBallots { poll: String },
    /// A ranking that does not have one entry per option of the poll.
    WrongRankingLength {
        poll: String,
        voter: String,
        expected: usize,
        found: usize,
    },
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::MismatchedBallots { poll } => {
                write!(f, "poll {:?}: ballots do not match the kind of poll", poll)
            }
            VotingErrors::WrongRankingLength {
                poll,
                voter,
                expected,
                found,
            } => write!(
                f,
                "poll {:?}, voter {:?}: ranking has {} entries, expected one per option ({})",
                poll, voter, found, expected
            ),
        }
    }
}
