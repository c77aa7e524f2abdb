use clap::Parser;

/// This is a program to evaluate the polls of an assembly of weighted voters.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON file describing the polls: their kind (median or schulze), name, majority
    /// threshold, abstention policy, and maximum amount or list of options.
    #[clap(short, long, value_parser)]
    pub polls: String,

    /// (file path, optional) The list of voters, with one 'name;weight' record per line. Lines starting
    /// with '#' are ignored.
    #[clap(long, value_parser)]
    pub voters: Option<String>,

    /// (file path, optional) The ballot table in CSV format: the first row lists the polls, and every
    /// other row holds the name of a voter followed by one vote per poll. Voters without a row abstain.
    #[clap(short, long, value_parser)]
    pub ballots: Option<String>,

    /// (file path, optional) If specified, an empty ballot table for the polls and the voters is written
    /// to this location, and nothing is evaluated.
    #[clap(short, long, value_parser)]
    pub template: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the polls will be written in JSON
    /// format to the given location. By default, it is printed to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the summary of the polls in JSON format. If provided,
    /// wvote will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, optional) If specified, the poll definitions are written back to this location after
    /// validation, in normalized form (numbers as decimal text, flags as True/False).
    #[clap(long, value_parser)]
    pub save_polls: Option<String>,

    /// (default ';') The delimiter of the fields in the voter list and in the ballot table.
    #[clap(short, long, value_parser, default_value_t = ';')]
    pub delimiter: char,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
