/*!

This is the long-form manual for `weighted_voting` and `wvote`.

## Procedures

Every poll is evaluated by one of two procedures. In both of them, each voter
carries a weight (for instance the number of members of the group it
represents), and every count is a sum of weights.

### `median`

Each voter proposes an amount, between 0 and the maximum amount of the poll.
The accepted amount is the highest amount for which the weight of the voters
proposing this amount or more is strictly greater than the required weight.

For instance, with a threshold of 1/2 and the following proposals:

| voter   | weight | amount |
|---------|--------|--------|
| Physics | 3      | 200    |
| History | 2      | 150    |
| Biology | 1      | 0      |

the total weight is 6 and the required weight is 3. Physics alone has a weight
of 3, which is not strictly greater than 3. Physics and History together have
a weight of 5, so the accepted amount is 150.

If the weight of all the voters does not exceed the required weight (for
instance with a threshold of 1), no amount is accepted.

### `schulze`

Each voter ranks the options of the poll with integers, lower is better. Equal
ranks are allowed and mean that the voter does not prefer one option over the
other. The options are ordered with the Schulze method:

1. for each pair of options `(i, j)`, the weight of the voters strictly
   preferring `i` to `j` is counted;
2. the strength of the strongest path from `i` to `j` is computed, where the
   strength of a path is its weakest link;
3. an option beats another if its strongest path to it is stronger than the
   path in the other direction, and the options are grouped by their number
   of such wins. Options with the same number of wins are tied.

By convention, the last option of a Schulze poll is the option to reject the
proposal (such as `No` or `None of the above`).

## Thresholds and abstentions

The threshold of a poll is a fraction between 0 and 1, written as a decimal
number (`0.5`) or as a fraction (`2/3`). The required weight is the total
weight multiplied by the threshold, rounded down.

A voter abstains by leaving the cell of a poll empty. When a poll counts all
the votes (`allVotes` is `True`), the abstention counts as a vote against the
proposal: a proposal of 0 for a median poll, and a ranking that puts the
rejection option first for a Schulze poll. Otherwise, the abstention is not
counted and does not contribute to the total weight.

## Input formats

### Poll definitions

The polls are described in a JSON file:

```json
{
  "polls": [
    {
      "type": "median",
      "name": "Sound system",
      "percent": "0.5",
      "allVotes": "True",
      "maxValue": "1500"
    },
    {
      "type": "schulze",
      "name": "Chair",
      "percent": "0.5",
      "allVotes": "False",
      "options": ["Anna", "Bob", "No"]
    }
  ]
}
```

The numbers may also be written as JSON numbers, and the flags as JSON
booleans. `wvote --save-polls` writes the definitions back in the form above.

### Voters

The voters are listed in a text file, one voter per line, with its name and its
weight separated by the delimiter (`;` by default):

```text
# name;weight
Physics;3
History;2
Biology;1
```

### Ballot table

The ballots are collected in a CSV file using the same delimiter. The first row
holds an empty cell followed by the names of the polls, in the order of the
poll definitions. Every other row holds the name of a voter followed by one
cell per poll: an amount for a median poll, and the ranks of all the options
separated by spaces for a Schulze poll.

```text
;Sound system;Chair
Physics;200;0 1 2
History;150;1 0 2
Biology;;
```

Voters of the list that have no row in the table abstain in all the polls.
An empty table with the right layout can be created with the `--template`
option.

## Running `wvote`

```bash
wvote --polls polls.json --voters voters.txt --template ballots.csv
# ... fill in the ballots ...
wvote --polls polls.json --voters voters.txt --ballots ballots.csv --out summary.json
```

The summary lists, for every poll, its definition, the total and required
weights, the counted votes, and either the accepted amount or the defeat and
strongest path matrices with the ranking of the options. It can be checked
against a reference summary with `--reference`.

*/
