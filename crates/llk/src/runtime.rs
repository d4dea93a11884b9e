//! The backtracking interpreter.
//!
//! Recursive descent is simulated with an explicit work stack (`todo`) of
//! [`Step`]s, and every action is appended to a [`Trace`]. A failing step
//! unwinds the trace to the most recent choice point:
//!
//! - the entry of an alternation, which resumes with the next alternative;
//! - the exit of a repetition, which resumes with one more repeat;
//!
//! stepping the token stream back over every consumed token on the way.
//! Repetitions commit to their minimum count going forward and only grow when
//! something after them fails, so the first successful derivation in declared
//! order wins and repeats are as few as the rest of the input allows.

use crate::errors::SyntaxError;
use crate::grammar::{Grammar, GrammarError, RuleId, RuleKind};
use crate::token::{Token, TokenStream};
use crate::trace::{Continuation, Invocation, Lexeme, Record, Step, Trace};

/// Tuning knobs of a [`Runtime`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of work items processed per parse, `None` for no limit.
    ///
    /// Backtracking is exponential on pathological grammars and does not
    /// terminate on left-recursive ones; a limit bounds both.
    pub step_limit: Option<usize>,
}

/// Runs a grammar against token streams.
///
/// The runtime only borrows the grammar, so one table can serve any number of
/// parses, concurrently or not.
#[derive(Debug, Clone)]
pub struct Runtime<'g> {
    grammar: &'g Grammar,
    root: RuleId,
    config: RuntimeConfig,
}

impl<'g> Runtime<'g> {
    /// A runtime starting from the grammar's root, without a step limit.
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, RuntimeConfig::default())
    }

    /// A runtime starting from the grammar's root.
    #[must_use]
    pub fn with_config(grammar: &'g Grammar, config: RuntimeConfig) -> Self {
        Self {
            grammar,
            root: grammar.root_id(),
            config,
        }
    }

    /// Starts parses from `root` instead of the grammar's root.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::UnknownRule`] if `root` was issued by another
    /// grammar.
    pub fn starting_at(mut self, root: RuleId) -> Result<Self, GrammarError> {
        if !self.grammar.contains(root) {
            return Err(GrammarError::UnknownRule(root));
        }
        self.root = root;
        Ok(self)
    }

    /// The grammar this runtime executes.
    #[must_use]
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Derives the whole of `stream` from the root rule.
    ///
    /// On success the stream is left at its end and the returned trace
    /// describes the first derivation found in declared order.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::UnexpectedToken`] or
    /// [`SyntaxError::UnexpectedEnd`] pointing at the furthest position
    /// reached once every choice point is exhausted, and
    /// [`SyntaxError::StepLimitExceeded`] when the configured budget runs out.
    pub fn parse<S>(&self, stream: &mut S) -> Result<Trace, SyntaxError>
    where
        S: TokenStream + ?Sized,
    {
        log::debug!(
            "starting parse at offset {} from root '{}'",
            stream.offset(),
            self.grammar.key(self.root)
        );

        let mut execution = Execution::new(self, stream);
        match execution.run() {
            Ok(()) => {
                log::debug!(
                    "parse succeeded: {} trace records, {} steps, {} backtracks",
                    execution.trace.len(),
                    execution.steps,
                    execution.backtracks
                );
                Ok(Trace::from(execution.trace))
            }
            Err(err) => {
                log::debug!(
                    "parse failed after {} steps, {} backtracks: {err}",
                    execution.steps,
                    execution.backtracks
                );
                Err(err)
            }
        }
    }
}

/// Furthest position any token was current during a parse.
///
/// Positions count consumed tokens, so zero-width tokens sharing an offset
/// are still ordered.
#[derive(Debug)]
struct Furthest {
    position: usize,
    offset: usize,
    token: Option<Token>,
}

/// Per-parse state.
struct Execution<'r, 'g, S: ?Sized> {
    runtime: &'r Runtime<'g>,
    stream: &'r mut S,
    trace: Vec<Record>,
    todo: Continuation,
    furthest: Furthest,
    /// Tokens consumed so far.
    position: usize,
    steps: usize,
    backtracks: usize,
}

impl<'r, 'g, S> Execution<'r, 'g, S>
where
    S: TokenStream + ?Sized,
{
    fn new(runtime: &'r Runtime<'g>, stream: &'r mut S) -> Self {
        let furthest = Furthest {
            position: 0,
            offset: stream.offset(),
            token: stream.current().cloned(),
        };
        Self {
            runtime,
            stream,
            trace: Vec::new(),
            todo: Continuation::new(),
            furthest,
            position: 0,
            steps: 0,
            backtracks: 0,
        }
    }

    fn grammar(&self) -> &'g Grammar {
        self.runtime.grammar
    }

    fn run(&mut self) -> Result<(), SyntaxError> {
        let root = self.runtime.root;
        self.todo.push_back(Step::exit(root, 0));
        self.todo.push_back(Step::entry(root, 0));

        loop {
            if !self.unfold()? {
                return Err(self.unexpected());
            }
            if self.stream.is_at_end() {
                return Ok(());
            }
            // The derivation finished with input left over.
            if !self.backtrack() {
                return Err(self.unexpected());
            }
        }
    }

    /// Processes pending work until the stack is empty (`true`) or a failure
    /// cannot be recovered from (`false`).
    fn unfold(&mut self) -> Result<bool, SyntaxError> {
        while let Some(step) = self.todo.pop_back() {
            self.tick()?;
            match step {
                Step::Exit(call) => self.record_exit(call),
                Step::Entry(call) => {
                    if !self.expand(&call) && !self.backtrack() {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    fn tick(&mut self) -> Result<(), SyntaxError> {
        self.steps += 1;
        match self.runtime.config.step_limit {
            Some(limit) if self.steps > limit => Err(SyntaxError::StepLimitExceeded {
                limit,
                offset: self.stream.offset(),
            }),
            _ => Ok(()),
        }
    }

    /// Executes one `Entry` step. Returns `false` if the step fails.
    fn expand(&mut self, call: &Invocation) -> bool {
        let rule = call.rule;

        match self.grammar().kind(rule) {
            RuleKind::Terminal { token, kept } => self.match_terminal(token, *kept),

            RuleKind::Concatenation(children) => {
                self.record_entry(Invocation::new(rule, 0));
                for &child in children.iter().rev() {
                    self.push_invocation(child);
                }
                true
            }

            RuleKind::Alternation(children) => {
                let Some(&child) = children.get(call.state) else {
                    return false;
                };
                let continuation = self.todo.clone();
                self.record_entry(Invocation::resumable(rule, call.state, continuation));
                self.push_invocation(child);
                true
            }

            RuleKind::Repetition { child, min, max } => {
                if call.state == 0 {
                    self.record_entry(Invocation::new(rule, *min));
                    // The pending exit is replaced by one that can be resumed.
                    self.todo.pop_back();
                    let continuation = self.todo.clone();
                    self.todo
                        .push_back(Step::Exit(Invocation::resumable(rule, *min, continuation)));
                    for _ in 0..*min {
                        self.push_invocation(*child);
                    }
                    return true;
                }

                if max.is_some_and(|max| call.state > max) {
                    return false;
                }
                let continuation = self.todo.clone();
                self.todo.push_back(Step::Exit(Invocation::resumable(
                    rule,
                    call.state,
                    continuation,
                )));
                self.push_invocation(*child);
                true
            }
        }
    }

    fn match_terminal(&mut self, expected: &str, kept: bool) -> bool {
        let token = match self.stream.current() {
            Some(token) if token.name == expected => token.clone(),
            _ => return false,
        };

        // A terminal never expands, so its pending exit is dropped.
        self.todo.pop_back();
        self.trace.push(Record::Matched(Lexeme { token, kept }));
        self.stream.next();
        self.position += 1;
        self.observe();
        true
    }

    fn push_invocation(&mut self, rule: RuleId) {
        self.todo.push_back(Step::exit(rule, 0));
        self.todo.push_back(Step::entry(rule, 0));
    }

    fn record_entry(&mut self, call: Invocation) {
        let offset = self.stream.offset();
        self.trace.push(Record::Entry { call, offset });
    }

    fn record_exit(&mut self, call: Invocation) {
        let offset = self.stream.offset();
        self.trace.push(Record::Exit { call, offset });
    }

    fn observe(&mut self) {
        if self.position > self.furthest.position {
            self.furthest = Furthest {
                position: self.position,
                offset: self.stream.offset(),
                token: self.stream.current().cloned(),
            };
        }
    }

    /// Unwinds the trace to the most recent choice point and schedules its
    /// next option. Returns `false` once there is nothing left to try.
    fn backtrack(&mut self) -> bool {
        self.backtracks += 1;

        while let Some(record) = self.trace.pop() {
            match record {
                Record::Entry { call, .. }
                    if matches!(self.grammar().kind(call.rule), RuleKind::Alternation(_)) =>
                {
                    return self.resume(call);
                }
                Record::Exit { call, .. }
                    if matches!(self.grammar().kind(call.rule), RuleKind::Repetition { .. }) =>
                {
                    return self.resume(call);
                }
                Record::Matched(_) => {
                    if !self.stream.previous() {
                        return false;
                    }
                    self.position -= 1;
                }
                Record::Entry { .. } | Record::Exit { .. } => {}
            }
        }

        false
    }

    fn resume(&mut self, call: Invocation) -> bool {
        let Some(continuation) = call.continuation else {
            return false;
        };

        log::trace!(
            "backtrack to '{}' at offset {}, retrying with state {}",
            self.grammar().key(call.rule),
            self.stream.offset(),
            call.state + 1
        );

        self.todo = continuation;
        self.todo.push_back(Step::entry(call.rule, call.state + 1));
        true
    }

    fn unexpected(&self) -> SyntaxError {
        match &self.furthest.token {
            Some(token) => SyntaxError::UnexpectedToken {
                token: token.clone(),
            },
            None => SyntaxError::UnexpectedEnd {
                offset: self.furthest.offset,
            },
        }
    }
}
