//! Confirmation policy for state-changing actions
//!
//! The decision is made here, not inside the action, so a whole run can be
//! driven without a terminal.

use std::io;

/// How state-changing actions get approved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmationPolicy {
    /// Approve everything without asking (non-interactive runs)
    AlwaysConfirm,
    /// Decline everything; only read-only checks run
    NeverConfirm,
    /// Ask once and reuse the answer for the rest of the invocation
    PromptOncePerInvocation,
    /// Ask before every action
    #[default]
    PromptEach,
}

/// Asks the user a yes/no question
pub trait Prompter {
    fn ask(&mut self, question: &str) -> io::Result<bool>;
}

/// Prompt on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> io::Result<bool> {
        let term = console::Term::stderr();
        if !term.is_term() {
            // Nobody to answer; treat as a refusal rather than blocking
            return Ok(false);
        }
        term.write_str(&format!("{} [y/N] ", question))?;
        let answer = term.read_line()?;
        Ok(is_yes(&answer))
    }
}

pub fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Applies a policy, remembering the answer where the policy says to
pub struct Confirmer {
    policy: ConfirmationPolicy,
    prompter: Box<dyn Prompter>,
    remembered: Option<bool>,
}

impl Confirmer {
    pub fn new(policy: ConfirmationPolicy, prompter: Box<dyn Prompter>) -> Self {
        Self {
            policy,
            prompter,
            remembered: None,
        }
    }

    /// Whether to go ahead with the described action. A prompt that fails
    /// (closed stdin, I/O error) counts as "no".
    pub fn confirm(&mut self, question: &str) -> bool {
        match self.policy {
            ConfirmationPolicy::AlwaysConfirm => true,
            ConfirmationPolicy::NeverConfirm => false,
            ConfirmationPolicy::PromptEach => self.prompter.ask(question).unwrap_or(false),
            ConfirmationPolicy::PromptOncePerInvocation => {
                if let Some(answer) = self.remembered {
                    return answer;
                }
                let answer = self
                    .prompter
                    .ask("Apply all maintenance actions in this run?")
                    .unwrap_or(false);
                self.remembered = Some(answer);
                answer
            }
        }
    }

    /// Whether the external tool should be told not to ask again itself
    /// (e.g. `pacman --noconfirm`)
    pub fn suppress_tool_prompts(&self) -> bool {
        self.policy == ConfirmationPolicy::AlwaysConfirm
    }
}
