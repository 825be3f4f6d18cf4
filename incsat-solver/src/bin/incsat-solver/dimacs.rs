//! A parser for the DIMACS CNF file format. Given that DIMACS files can be very large, the
//! implementation reads the file in chunks. The parser does not allocate for every encountered
//! clause, but re-uses its buffers.
//!
//! The parser operates on a type that implements the [`DimacsSink`] trait, which is the interface
//! between the parser and the consumer of the clauses. Clauses are forwarded to the sink as soon
//! as their terminating `0` is read.
//!
//! The parser should not be used as a DIMACS validator. Even though it should only accept valid
//! DIMACS files, the errors are not extremely detailed.
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::num::NonZeroI32;
use std::str::FromStr;

use incsat_solver::exchange::Portfolio;
use incsat_solver::ProtocolViolation;
use incsat_solver::SolverInstance;
use incsat_solver::SolverOptions;
use thiserror::Error;

/// A dimacs sink receives the clauses of a formula.
pub(crate) trait DimacsSink: Sized {
    /// The arguments to the dimacs sink.
    type ConstructorArgs;

    /// Create an empty formula over the number of variables declared in the header.
    fn empty(args: Self::ConstructorArgs, num_variables: usize) -> Self;

    /// Add a clause to the formula.
    fn add_clause(&mut self, clause: &[NonZeroI32]) -> Result<(), ProtocolViolation>;
}

#[derive(Debug, Error)]
pub(crate) enum DimacsParseError {
    #[error("failed to read file")]
    Io(#[from] std::io::Error),

    #[error("missing dimacs header")]
    MissingHeader,

    #[error("'{0}' is an invalid header")]
    InvalidHeader(String),

    #[error("multiple dimacs headers found")]
    DuplicateHeader,

    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    #[error("'{0}' is an invalid DIMACS literal")]
    InvalidLiteral(String),

    #[error("literal {literal} is outside of the {num_variables} declared variables")]
    LiteralOutOfRange { literal: i32, num_variables: usize },

    #[error("the last clause in the source is not terminated with a '0'")]
    UnterminatedClause,

    #[error("expected to parse {expected} clauses, but parsed {parsed}")]
    IncorrectClauseCount { expected: usize, parsed: usize },

    #[error("the solver rejected a clause: {0}")]
    Rejected(#[from] ProtocolViolation),
}

pub(crate) fn parse_cnf<Sink: DimacsSink>(
    source: impl Read,
    sink_constructor_args: Sink::ConstructorArgs,
) -> Result<Sink, DimacsParseError> {
    let mut reader = BufReader::new(source);
    let mut parser = DimacsParser::<Sink>::new(sink_constructor_args);

    loop {
        let num_bytes = {
            let data = reader.fill_buf()?;

            if data.is_empty() {
                return parser.complete();
            }

            parser.parse_chunk(data)?;
            data.len()
        };

        reader.consume(num_bytes);
    }
}

struct DimacsParser<Sink: DimacsSink> {
    sink_constructor_args: Option<Sink::ConstructorArgs>,
    sink: Option<Sink>,
    header: Option<CNFHeader>,
    buffer: String,
    clause: Vec<NonZeroI32>,
    state: ParseState,
    parsed_clauses: usize,
}

enum ParseState {
    StartLine,
    Header,
    Comment,
    Literal,
    NegativeLiteral,
    Clause,
}

impl<Sink: DimacsSink> DimacsParser<Sink> {
    fn new(sink_constructor_args: Sink::ConstructorArgs) -> Self {
        DimacsParser {
            sink_constructor_args: Some(sink_constructor_args),
            sink: None,
            header: None,
            buffer: String::new(),
            clause: vec![],
            state: ParseState::StartLine,
            parsed_clauses: 0,
        }
    }

    /// Parse the next chunk of bytes. This may start in the middle of parsing a clause or file
    /// header, and may end in such a state as well.
    fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), DimacsParseError> {
        for byte in chunk {
            match self.state {
                ParseState::StartLine => match byte {
                    b if b.is_ascii_whitespace() => {}

                    b'p' => {
                        self.state = ParseState::Header;
                        self.buffer.clear();
                        self.buffer.push('p');
                    }

                    b'c' => {
                        self.state = ParseState::Comment;
                    }

                    b @ b'1'..=b'9' => {
                        self.start_literal(b, true);
                    }

                    // An empty clause, or the terminator of a clause spanning several lines.
                    b'0' => self.finish_clause()?,

                    b'-' => self.start_literal(&b'-', false),

                    b => return Err(DimacsParseError::UnexpectedCharacter(*b as char)),
                },

                ParseState::Header => match byte {
                    b'\n' => {
                        self.init_formula()?;
                        self.state = ParseState::StartLine;
                    }

                    b => self.buffer.push(*b as char),
                },

                ParseState::Comment => {
                    if *byte == b'\n' {
                        self.state = ParseState::StartLine;
                    }
                }

                ParseState::Literal => match byte {
                    b if b.is_ascii_whitespace() => {
                        self.finish_literal()?;
                        if *b == b'\n' {
                            self.state = ParseState::StartLine;
                        }
                    }

                    b @ b'0'..=b'9' => self.buffer.push(*b as char),

                    b => return Err(DimacsParseError::UnexpectedCharacter(*b as char)),
                },

                ParseState::NegativeLiteral => match byte {
                    b @ b'1'..=b'9' => {
                        self.buffer.push(*b as char);
                        self.state = ParseState::Literal;
                    }

                    b => return Err(DimacsParseError::UnexpectedCharacter(*b as char)),
                },

                ParseState::Clause => match byte {
                    b'0' => self.finish_clause()?,

                    // A new-line does not terminate the clause. The clause buffer is kept, so
                    // comments and leading whitespace on the next line are handled by the
                    // StartLine state before the clause continues.
                    b'\n' => self.state = ParseState::StartLine,
                    b if b.is_ascii_whitespace() => {}

                    b @ b'1'..=b'9' => self.start_literal(b, true),
                    b'-' => self.start_literal(&b'-', false),

                    b => return Err(DimacsParseError::UnexpectedCharacter(*b as char)),
                },
            }
        }

        Ok(())
    }

    fn start_literal(&mut self, b: &u8, is_positive: bool) {
        self.state = if is_positive {
            ParseState::Literal
        } else {
            ParseState::NegativeLiteral
        };

        self.buffer.clear();
        self.buffer.push(*b as char);
    }

    fn complete(mut self) -> Result<Sink, DimacsParseError> {
        match self.state {
            // The header is the last line and has no trailing new-line.
            ParseState::Header => self.init_formula()?,
            ParseState::Literal | ParseState::NegativeLiteral => {
                return Err(DimacsParseError::UnterminatedClause)
            }
            _ => {}
        }

        let sink = self.sink.ok_or(DimacsParseError::MissingHeader)?;
        let num_clauses = self
            .header
            .as_ref()
            .map_or(0, |header| header.num_clauses);

        if !self.clause.is_empty() {
            Err(DimacsParseError::UnterminatedClause)
        } else if num_clauses != self.parsed_clauses {
            Err(DimacsParseError::IncorrectClauseCount {
                expected: num_clauses,
                parsed: self.parsed_clauses,
            })
        } else {
            Ok(sink)
        }
    }

    fn init_formula(&mut self) -> Result<(), DimacsParseError> {
        let header = self.buffer.trim().parse::<CNFHeader>()?;

        self.sink = Some(Sink::empty(
            self.sink_constructor_args
                .take()
                .ok_or(DimacsParseError::DuplicateHeader)?,
            header.num_variables,
        ));

        self.header = Some(header);

        Ok(())
    }

    fn finish_literal(&mut self) -> Result<(), DimacsParseError> {
        let header = self.header.as_ref().ok_or(DimacsParseError::MissingHeader)?;

        let literal = self
            .buffer
            .parse::<i32>()
            .ok()
            .and_then(NonZeroI32::new)
            .ok_or_else(|| DimacsParseError::InvalidLiteral(self.buffer.clone()))?;

        if literal.unsigned_abs().get() as usize > header.num_variables {
            return Err(DimacsParseError::LiteralOutOfRange {
                literal: literal.get(),
                num_variables: header.num_variables,
            });
        }

        self.clause.push(literal);
        self.state = ParseState::Clause;

        Ok(())
    }

    fn finish_clause(&mut self) -> Result<(), DimacsParseError> {
        let sink = self.sink.as_mut().ok_or(DimacsParseError::MissingHeader)?;

        self.parsed_clauses += 1;
        sink.add_clause(&self.clause)?;
        self.clause.clear();
        self.state = ParseState::StartLine;

        Ok(())
    }
}

struct CNFHeader {
    num_variables: usize,
    num_clauses: usize,
}

impl FromStr for CNFHeader {
    type Err = DimacsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with("p cnf ") {
            return Err(DimacsParseError::InvalidHeader(s.to_owned()));
        }

        let mut components = s.split_whitespace().skip(2);

        let num_variables = next_header_component::<usize>(&mut components, s)?;
        let num_clauses = next_header_component::<usize>(&mut components, s)?;

        if components.next().is_some() {
            return Err(DimacsParseError::InvalidHeader(s.to_owned()));
        }

        Ok(Self {
            num_variables,
            num_clauses,
        })
    }
}

fn next_header_component<'a, Num: FromStr>(
    components: &mut impl Iterator<Item = &'a str>,
    header: &str,
) -> Result<Num, DimacsParseError> {
    components
        .next()
        .ok_or_else(|| DimacsParseError::InvalidHeader(header.to_owned()))?
        .parse::<Num>()
        .map_err(|_| DimacsParseError::InvalidHeader(header.to_owned()))
}

/// A formula read from a DIMACS file, together with the number of variables its header declares.
#[derive(Debug)]
pub(crate) struct DimacsFormula<Solver> {
    pub(crate) solver: Solver,
    pub(crate) num_variables: usize,
}

impl DimacsSink for DimacsFormula<SolverInstance> {
    type ConstructorArgs = SolverOptions;

    fn empty(options: Self::ConstructorArgs, num_variables: usize) -> Self {
        DimacsFormula {
            solver: SolverInstance::with_options(options),
            num_variables,
        }
    }

    fn add_clause(&mut self, clause: &[NonZeroI32]) -> Result<(), ProtocolViolation> {
        for literal in clause {
            self.solver.add(literal.get())?;
        }
        self.solver.add(0)
    }
}

/// Builds a [`Portfolio`] of the given number of instances.
impl DimacsSink for DimacsFormula<Portfolio> {
    type ConstructorArgs = (usize, SolverOptions);

    fn empty((num_instances, options): Self::ConstructorArgs, num_variables: usize) -> Self {
        DimacsFormula {
            solver: Portfolio::new(num_instances, options),
            num_variables,
        }
    }

    fn add_clause(&mut self, clause: &[NonZeroI32]) -> Result<(), ProtocolViolation> {
        for literal in clause {
            self.solver.add(literal.get())?;
        }
        self.solver.add(0)
    }
}

#[cfg(test)]
mod tests {
    use incsat_solver::SolveResult;

    use super::*;

    #[test]
    fn basic_instance_is_read() {
        let source = "p cnf 2 2\n1 -2 0\n-1 2 0";
        let formula = parse_cnf_source(source);

        assert_eq!(vec![vec![1, -2], vec![-1, 2]], formula);
    }

    #[test]
    fn instance_with_two_character_codes_is_accepted() {
        let source = "p cnf 11 2\n1 -2 10 0\n-1 2 -11 0";
        let formula = parse_cnf_source(source);

        assert_eq!(vec![vec![1, -2, 10], vec![-1, 2, -11]], formula);
    }

    #[test]
    fn comments_are_ignored() {
        let source = "c this is\nc a comment\np cnf 2 2\n1 -2 0\nc within the file\n-1 2 0\n";
        let formula = parse_cnf_source(source);

        assert_eq!(vec![vec![1, -2], vec![-1, 2]], formula);
    }

    #[test]
    fn whitespace_and_empty_lines_are_ignored() {
        let source = r#"

            p cnf 2 2


             1 -2 0

            -1  2 0
        "#;

        let formula = parse_cnf_source(source);

        assert_eq!(vec![vec![1, -2], vec![-1, 2]], formula);
    }

    #[test]
    fn clauses_on_same_line_are_separated() {
        let source = "p cnf 2 2\n1 -2 0 -1 2 0";
        let formula = parse_cnf_source(source);

        assert_eq!(vec![vec![1, -2], vec![-1, 2]], formula);
    }

    #[test]
    fn new_lines_do_not_terminate_clause() {
        let source = "p cnf 2 2\n1\n-2 0 -1 2\n 0";
        let formula = parse_cnf_source(source);

        assert_eq!(vec![vec![1, -2], vec![-1, 2]], formula);
    }

    #[test]
    fn empty_clause_is_read() {
        let source = "p cnf 1 2\n1 0\n0\n";
        let formula = parse_cnf_source(source);

        assert_eq!(vec![vec![1], vec![]], formula);
    }

    #[test]
    fn header_without_clauses_is_accepted() {
        let formula = parse_cnf_source("p cnf 3 0");

        assert!(formula.is_empty());
    }

    #[test]
    fn negative_zero_is_an_unexpected_sequence() {
        let source = "p cnf 2 1\n1 -2 -0";
        let err = get_cnf_parse_error(source);

        assert!(matches!(err, DimacsParseError::UnexpectedCharacter('0')));
    }

    #[test]
    fn incomplete_clause_causes_error() {
        let source = "p cnf 2 1\n1 -2";
        let err = get_cnf_parse_error(source);

        assert!(matches!(err, DimacsParseError::UnterminatedClause));
    }

    #[test]
    fn incorrect_reported_clause_count() {
        let source = "p cnf 2 2\n1 -2 0";
        let err = get_cnf_parse_error(source);

        assert!(matches!(
            err,
            DimacsParseError::IncorrectClauseCount {
                expected: 2,
                parsed: 1
            }
        ));
    }

    #[test]
    fn literals_beyond_the_header_are_rejected() {
        let source = "p cnf 2 1\n1 3 0\n";
        let err = get_cnf_parse_error(source);

        assert!(matches!(
            err,
            DimacsParseError::LiteralOutOfRange {
                literal: 3,
                num_variables: 2
            }
        ));
    }

    #[test]
    fn clauses_before_the_header_are_rejected() {
        let err = get_cnf_parse_error("1 2 0\np cnf 2 1\n");

        assert!(matches!(err, DimacsParseError::MissingHeader));
    }

    #[test]
    fn second_header_is_rejected() {
        let err = get_cnf_parse_error("p cnf 2 0\np cnf 2 0\n");

        assert!(matches!(err, DimacsParseError::DuplicateHeader));
    }

    #[test]
    fn wcnf_header_is_rejected() {
        let err = get_cnf_parse_error("p wcnf 2 1 4\n4 1 0\n");

        assert!(matches!(err, DimacsParseError::InvalidHeader(_)));
    }

    #[test]
    fn clauses_are_streamed_into_an_instance() {
        let source = "p cnf 2 4\n1 2 0\n-1 2 0\n1 -2 0\n-1 -2 0\n";
        let mut formula =
            parse_cnf::<DimacsFormula<SolverInstance>>(source.as_bytes(), SolverOptions::default())
                .expect("valid dimacs");

        assert_eq!(formula.num_variables, 2);
        assert_eq!(formula.solver.irredundant_clauses(), 4);
        assert_eq!(formula.solver.solve(), Ok(SolveResult::Unsatisfiable));
    }

    #[test]
    fn clauses_are_streamed_into_every_portfolio_instance() {
        let source = "p cnf 3 2\n1 2 0\n-1 3 0\n";
        let formula = parse_cnf::<DimacsFormula<Portfolio>>(
            source.as_bytes(),
            (2, SolverOptions::default()),
        )
        .expect("valid dimacs");

        assert_eq!(formula.solver.len(), 2);
        for index in 0..formula.solver.len() {
            assert_eq!(formula.solver.instance(index).borrow().irredundant_clauses(), 2);
        }
    }

    fn parse_cnf_source(source: &str) -> Vec<Vec<i32>> {
        parse_cnf::<Vec<Vec<i32>>>(source.as_bytes(), ()).expect("valid dimacs")
    }

    fn get_cnf_parse_error(source: &str) -> DimacsParseError {
        parse_cnf::<Vec<Vec<i32>>>(source.as_bytes(), ()).expect_err("invalid dimacs")
    }

    impl DimacsSink for Vec<Vec<i32>> {
        type ConstructorArgs = ();

        fn empty(_: Self::ConstructorArgs, _: usize) -> Self {
            vec![]
        }

        fn add_clause(&mut self, clause: &[NonZeroI32]) -> Result<(), ProtocolViolation> {
            self.push(clause.iter().map(|lit| lit.get()).collect());
            Ok(())
        }
    }
}
