//! The Glyph machine
//!
//! A direct interpreter over the program text: no tokenizer, no syntax
//! tree. The scan position walks the characters left to right and each
//! character — or an `A`/`I`/`S`/`M` prefix plus the character after it —
//! dispatches straight into an instruction handler. Text values double as
//! programs: `?` and `@` recurse into this same loop with the quotation's
//! content, mutating the same two stacks as their caller.
//!
//! The machine holds no other state between instructions: just the two
//! stacks, the line input provider, the output sink, and the random
//! number generator for `MR`.

use crate::arithmetic::{self, BinOp};
use crate::fault::{Expected, Fault, FaultKind, Ordinal, StackId};
use crate::io as machine_io;
use crate::list_ops;
use crate::math_ops;
use crate::stack::Stack;
use crate::string_ops;
use crate::value::Value;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{BufRead, Write};
use tracing::{debug, trace};

/// Keep this much call stack in reserve before growing (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Call stack to allocate per growth step (1MB). Quotations recurse on
/// the call stack, one frame per nesting level.
const STACK_PER_QUOTATION: usize = 1024 * 1024;

/// The Glyph interpreter: two value stacks plus the external
/// collaborators (line input, output sink, RNG).
pub struct Interpreter<R, W> {
    /// The general-purpose operand stack nearly all instructions use.
    pub primary: Stack,
    /// The auxiliary holding area reached via `#` and `'`.
    pub secondary: Stack,
    input: R,
    output: W,
    rng: StdRng,
}

impl<R: BufRead, W: Write> Interpreter<R, W> {
    /// Create a machine with empty stacks and an entropy-seeded RNG.
    pub fn new(input: R, output: W) -> Self {
        Self::with_rng(input, output, StdRng::from_entropy())
    }

    /// Create a machine with a fixed RNG seed, for deterministic `MR`.
    pub fn with_seed(input: R, output: W, seed: u64) -> Self {
        Self::with_rng(input, output, StdRng::seed_from_u64(seed))
    }

    fn with_rng(input: R, output: W, rng: StdRng) -> Self {
        Interpreter {
            primary: Stack::new(),
            secondary: Stack::new(),
            input,
            output,
            rng,
        }
    }

    /// Borrow the output sink, e.g. to write a diagnostic report to the
    /// same stream the program printed to.
    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    /// Consume the machine and hand back the output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Execute a program against the machine's stacks.
    ///
    /// Completes normally or returns the first fault; a fault aborts the
    /// whole run and propagates out of every quotation level unchanged.
    pub fn run(&mut self, program: &str) -> Result<(), Fault> {
        debug!(length = program.len(), "executing program");
        let chars: Vec<char> = program.chars().collect();
        let mut pos = 0;
        while pos < chars.len() {
            pos = self.step(program, &chars, pos)?;
        }
        Ok(())
    }

    /// Execute the instruction at `pos`, returning the next scan position.
    fn step(&mut self, program: &str, chars: &[char], pos: usize) -> Result<usize, Fault> {
        let c = chars[pos];
        trace!(
            instruction = %c,
            position = pos,
            primary = self.primary.len(),
            secondary = self.secondary.len(),
            "dispatch"
        );
        let fail = |kind: FaultKind| Fault::at(kind, program, pos);
        match c {
            ' ' | '\n' => Ok(pos + 1),

            '0'..='9' => Ok(self.number_literal(chars, pos)),
            '(' => self.text_literal(program, chars, pos),

            ':' => {
                self.dup().map_err(fail)?;
                Ok(pos + 1)
            }
            '^' => {
                self.drop_top().map_err(fail)?;
                Ok(pos + 1)
            }
            '$' => {
                self.swap_top().map_err(fail)?;
                Ok(pos + 1)
            }
            '#' => {
                self.to_secondary().map_err(fail)?;
                Ok(pos + 1)
            }
            '\'' => {
                self.to_primary().map_err(fail)?;
                Ok(pos + 1)
            }

            ',' => {
                machine_io::read_line(&mut self.input, &mut self.primary);
                Ok(pos + 1)
            }
            '!' => {
                machine_io::print(&mut self.output, &mut self.primary).map_err(fail)?;
                Ok(pos + 1)
            }

            '+' => self.binary(BinOp::Add, fail, pos),
            '-' => self.binary(BinOp::Sub, fail, pos),
            '*' => self.binary(BinOp::Mul, fail, pos),
            '/' => self.binary(BinOp::Div, fail, pos),
            '%' => self.binary(BinOp::Rem, fail, pos),
            '<' => self.binary(BinOp::Lt, fail, pos),
            '>' => self.binary(BinOp::Gt, fail, pos),
            '=' => self.binary(BinOp::Eq, fail, pos),
            '&' => self.binary(BinOp::And, fail, pos),
            '|' => self.binary(BinOp::Or, fail, pos),

            '?' => {
                self.cond_once(program, pos)?;
                Ok(pos + 1)
            }
            '@' => {
                self.while_loop(program, pos)?;
                Ok(pos + 1)
            }

            'A' => self.namespaced(program, chars, pos, Self::array_op),
            'I' => self.namespaced(program, chars, pos, Self::machine_op),
            'S' => self.namespaced(program, chars, pos, Self::text_op),
            'M' => self.namespaced(program, chars, pos, Self::math_op),

            other => Err(fail(FaultKind::InvalidInstruction(other))),
        }
    }

    fn binary(
        &mut self,
        op: BinOp,
        fail: impl Fn(FaultKind) -> Fault,
        pos: usize,
    ) -> Result<usize, Fault> {
        arithmetic::apply(&mut self.primary, op).map_err(fail)?;
        Ok(pos + 1)
    }

    /// Dispatch a two-character namespaced instruction. The prefix names
    /// the group, the following character the operation; an unrecognized
    /// sub-instruction is an immediate fault naming that character, and a
    /// prefix ending the program is a fault naming the prefix.
    fn namespaced(
        &mut self,
        program: &str,
        chars: &[char],
        pos: usize,
        group: fn(&mut Self, char) -> Result<(), FaultKind>,
    ) -> Result<usize, Fault> {
        let Some(&sub) = chars.get(pos + 1) else {
            return Err(Fault::at(
                FaultKind::InvalidInstruction(chars[pos]),
                program,
                pos,
            ));
        };
        group(self, sub).map_err(|kind| Fault::at(kind, program, pos + 1))?;
        Ok(pos + 2)
    }

    /// Scan a number literal and push it; returns the position after it.
    ///
    /// The maximal digit run, optionally followed by `.` and another
    /// digit run, is consumed. A `.` not followed by a digit is left in
    /// place, so `3.` parses as Int 3 and the dangling `.` faults as an
    /// invalid instruction on the next step.
    fn number_literal(&mut self, chars: &[char], start: usize) -> usize {
        let mut end = start;
        while end < chars.len() && chars[end].is_ascii_digit() {
            end += 1;
        }
        let mut is_float = false;
        if end < chars.len()
            && chars[end] == '.'
            && chars.get(end + 1).is_some_and(char::is_ascii_digit)
        {
            is_float = true;
            end += 1;
            while end < chars.len() && chars[end].is_ascii_digit() {
                end += 1;
            }
        }
        let literal: String = chars[start..end].iter().collect();
        if is_float {
            // A digit string always parses; absurdly long ones overflow
            // to infinity.
            self.primary
                .push(Value::Float(literal.parse().unwrap_or(f64::INFINITY)));
        } else {
            // Overflow saturates.
            self.primary
                .push(Value::Int(literal.parse().unwrap_or(i64::MAX)));
        }
        end
    }

    /// Scan a `(`…`)` text literal and push its content; returns the
    /// position after the closing paren. Parens nest; the content is
    /// taken verbatim with no escaping.
    fn text_literal(&mut self, program: &str, chars: &[char], open: usize) -> Result<usize, Fault> {
        let mut depth = 1usize;
        let mut index = open + 1;
        while index < chars.len() {
            match chars[index] {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let content: String = chars[open + 1..index].iter().collect();
                        self.primary.push(Value::Text(content));
                        return Ok(index + 1);
                    }
                }
                _ => {}
            }
            index += 1;
        }
        Err(Fault::at(
            FaultKind::UnterminatedLiteral,
            program,
            chars.len(),
        ))
    }

    /// `:` — push a deep copy of the top value.
    ///
    /// Stack effect: ( a -- a a )
    fn dup(&mut self) -> Result<(), FaultKind> {
        if self.primary.is_empty() {
            return Err(FaultKind::StackUnderflow(StackId::Primary));
        }
        let copy = self.primary.get(self.primary.len() - 1).clone();
        self.primary.push(copy);
        Ok(())
    }

    /// `^` — pop and release the top value.
    ///
    /// Stack effect: ( a -- )
    fn drop_top(&mut self) -> Result<(), FaultKind> {
        if self.primary.is_empty() {
            return Err(FaultKind::StackUnderflow(StackId::Primary));
        }
        self.primary.pop();
        Ok(())
    }

    /// `$` — exchange the top two values in place.
    ///
    /// Stack effect: ( a b -- b a )
    fn swap_top(&mut self) -> Result<(), FaultKind> {
        if self.primary.len() < 2 {
            return Err(FaultKind::StackUnderflow(StackId::Primary));
        }
        let top = self.primary.len() - 1;
        self.primary.swap(top, top - 1);
        Ok(())
    }

    /// `#` — move the top of primary onto secondary.
    fn to_secondary(&mut self) -> Result<(), FaultKind> {
        if self.primary.is_empty() {
            return Err(FaultKind::StackUnderflow(StackId::Primary));
        }
        let value = self.primary.pop();
        self.secondary.push(value);
        Ok(())
    }

    /// `'` — move the top of secondary onto primary.
    fn to_primary(&mut self) -> Result<(), FaultKind> {
        if self.secondary.is_empty() {
            return Err(FaultKind::StackUnderflow(StackId::Secondary));
        }
        let value = self.secondary.pop();
        self.primary.push(value);
        Ok(())
    }

    /// `?` — pop a quotation and a condition value; execute the quotation
    /// when the condition is truthy. The condition may be any variant.
    ///
    /// Stack effect: ( c e -- )
    fn cond_once(&mut self, program: &str, pos: usize) -> Result<(), Fault> {
        let fail = |kind: FaultKind| Fault::at(kind, program, pos);
        if self.primary.len() < 2 {
            return Err(fail(FaultKind::StackUnderflow(StackId::Primary)));
        }
        match self.primary.get(self.primary.len() - 1) {
            Value::Text(_) => {}
            _ => {
                return Err(fail(FaultKind::TypeMismatch {
                    ordinal: Ordinal::First,
                    expected: Expected::Text,
                }));
            }
        }
        let body = self.primary.pop().into_text();
        let condition = self.primary.pop();
        if condition.is_truthy() {
            self.run_quotation(&body)?;
        }
        Ok(())
    }

    /// `@` — pop a loop body and a condition body (both quotations). Run
    /// the condition body, pop its result, and while that result is
    /// truthy run the loop body and repeat from the condition body.
    ///
    /// Stack effect: ( c e -- )
    fn while_loop(&mut self, program: &str, pos: usize) -> Result<(), Fault> {
        let fail = |kind: FaultKind| Fault::at(kind, program, pos);
        if self.primary.len() < 2 {
            return Err(fail(FaultKind::StackUnderflow(StackId::Primary)));
        }
        match self.primary.get(self.primary.len() - 1) {
            Value::Text(_) => {}
            _ => {
                return Err(fail(FaultKind::TypeMismatch {
                    ordinal: Ordinal::First,
                    expected: Expected::Text,
                }));
            }
        }
        match self.primary.get(self.primary.len() - 2) {
            Value::Text(_) => {}
            _ => {
                return Err(fail(FaultKind::TypeMismatch {
                    ordinal: Ordinal::Second,
                    expected: Expected::Text,
                }));
            }
        }
        let body = self.primary.pop().into_text();
        let condition = self.primary.pop().into_text();
        loop {
            self.run_quotation(&condition)?;
            if self.primary.is_empty() {
                return Err(fail(FaultKind::StackUnderflow(StackId::Primary)));
            }
            let result = self.primary.pop();
            if !result.is_truthy() {
                break;
            }
            self.run_quotation(&body)?;
        }
        Ok(())
    }

    /// Execute a quotation against the same two stacks. Recursion depth
    /// equals quotation nesting depth; the call stack grows in slabs so
    /// deep nesting degrades gracefully instead of overflowing.
    fn run_quotation(&mut self, source: &str) -> Result<(), Fault> {
        stacker::maybe_grow(RED_ZONE, STACK_PER_QUOTATION, || self.run(source))
    }

    /// `A` group: array instructions.
    fn array_op(&mut self, sub: char) -> Result<(), FaultKind> {
        match sub {
            'c' => {
                list_ops::create(&mut self.primary);
                Ok(())
            }
            'p' => list_ops::push(&mut self.primary),
            'g' => list_ops::get(&mut self.primary),
            's' => list_ops::set(&mut self.primary),
            'r' => list_ops::remove(&mut self.primary),
            'l' => list_ops::length(&mut self.primary),
            other => Err(FaultKind::InvalidInstruction(other)),
        }
    }

    /// `I` group: machine instructions.
    fn machine_op(&mut self, sub: char) -> Result<(), FaultKind> {
        match sub {
            // Reset: release everything and start from two empty stacks.
            'r' => {
                self.primary.clear();
                self.secondary.clear();
                Ok(())
            }
            'p' => machine_io::print_raw(&mut self.output, &mut self.primary),
            'd' => {
                machine_io::debug_dump(&mut self.output, &self.primary, &self.secondary);
                Ok(())
            }
            'P' => {
                let size = self.primary.len() as i64;
                self.primary.push(Value::Int(size));
                Ok(())
            }
            'S' => {
                let size = self.secondary.len() as i64;
                self.primary.push(Value::Int(size));
                Ok(())
            }
            other => Err(FaultKind::InvalidInstruction(other)),
        }
    }

    /// `S` group: text instructions.
    fn text_op(&mut self, sub: char) -> Result<(), FaultKind> {
        match sub {
            'm' => string_ops::merge(&mut self.primary),
            's' => string_ops::substring(&mut self.primary),
            'l' => string_ops::length(&mut self.primary),
            other => Err(FaultKind::InvalidInstruction(other)),
        }
    }

    /// `M` group: math instructions.
    fn math_op(&mut self, sub: char) -> Result<(), FaultKind> {
        use std::f64::consts;
        match sub {
            'P' => {
                math_ops::constant(&mut self.primary, consts::PI);
                Ok(())
            }
            'T' => {
                math_ops::constant(&mut self.primary, consts::TAU);
                Ok(())
            }
            'E' => {
                math_ops::constant(&mut self.primary, consts::E);
                Ok(())
            }
            'R' => {
                math_ops::random(&mut self.primary, &mut self.rng);
                Ok(())
            }
            'f' => math_ops::to_float(&mut self.primary),
            'u' => math_ops::round(&mut self.primary, f64::ceil),
            'd' => math_ops::round(&mut self.primary, f64::floor),
            'n' => math_ops::round(&mut self.primary, f64::round),
            's' => math_ops::map(&mut self.primary, f64::sin),
            'c' => math_ops::map(&mut self.primary, f64::cos),
            't' => math_ops::map(&mut self.primary, f64::tan),
            'a' => math_ops::absolute(&mut self.primary),
            'r' => math_ops::map(&mut self.primary, f64::sqrt),
            'p' => math_ops::power(&mut self.primary),
            other => Err(FaultKind::InvalidInstruction(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn machine(input: &str) -> Interpreter<Cursor<Vec<u8>>, Vec<u8>> {
        Interpreter::with_seed(Cursor::new(input.as_bytes().to_vec()), Vec::new(), 0)
    }

    fn run_ok(program: &str) -> Interpreter<Cursor<Vec<u8>>, Vec<u8>> {
        let mut interp = machine("");
        interp.run(program).unwrap();
        interp
    }

    fn run_err(program: &str) -> Fault {
        let mut interp = machine("");
        interp.run(program).unwrap_err()
    }

    #[test]
    fn test_number_literals() {
        let interp = run_ok("12 3.5 0.25");
        assert_eq!(interp.primary.get(0), &Value::Int(12));
        assert_eq!(interp.primary.get(1), &Value::Float(3.5));
        assert_eq!(interp.primary.get(2), &Value::Float(0.25));
    }

    #[test]
    fn test_dot_without_digit_is_not_consumed() {
        // "3." parses as Int 3, then the dangling dot is no instruction.
        let fault = run_err("3.");
        assert_eq!(fault.kind, FaultKind::InvalidInstruction('.'));
        assert_eq!(fault.position, 1);
    }

    #[test]
    fn test_text_literal_nesting() {
        let interp = run_ok("(a(b)c)");
        assert_eq!(interp.primary.get(0), &Value::Text("a(b)c".to_string()));
    }

    #[test]
    fn test_empty_text_literal() {
        let interp = run_ok("()");
        assert_eq!(interp.primary.get(0), &Value::Text(String::new()));
    }

    #[test]
    fn test_unterminated_literal() {
        let fault = run_err("1(abc");
        assert_eq!(fault.kind, FaultKind::UnterminatedLiteral);
        assert_eq!(fault.position, 5);
    }

    #[test]
    fn test_dup_is_a_deep_copy() {
        let mut interp = run_ok("Ac1Ap:");
        // Mutate the copy; the original array must not change.
        interp.run("2Ap").unwrap();
        match (interp.primary.get(0), interp.primary.get(1)) {
            (Value::Array(original), Value::Array(copy)) => {
                assert_eq!(original.len(), 1);
                assert_eq!(copy.len(), 2);
            }
            other => panic!("expected two Arrays, got {:?}", other),
        }
    }

    #[test]
    fn test_swap_and_drop() {
        let interp = run_ok("1 2 $ ^");
        assert_eq!(interp.primary.len(), 1);
        assert_eq!(interp.primary.get(0), &Value::Int(2));
    }

    #[test]
    fn test_secondary_moves() {
        let interp = run_ok("1 2 # #");
        assert!(interp.primary.is_empty());
        assert_eq!(interp.secondary.get(0), &Value::Int(2));
        assert_eq!(interp.secondary.get(1), &Value::Int(1));

        let interp = run_ok("1 # '");
        assert_eq!(interp.primary.get(0), &Value::Int(1));
        assert!(interp.secondary.is_empty());
    }

    #[test]
    fn test_move_from_empty_secondary() {
        let fault = run_err("'");
        assert_eq!(
            fault.kind,
            FaultKind::StackUnderflow(StackId::Secondary)
        );
    }

    #[test]
    fn test_read_line_pushes_text() {
        let mut interp = machine("hello\nworld\n");
        interp.run(",,").unwrap();
        assert_eq!(interp.primary.get(0), &Value::Text("hello".to_string()));
        assert_eq!(interp.primary.get(1), &Value::Text("world".to_string()));
    }

    #[test]
    fn test_read_line_after_end_of_input() {
        let mut interp = machine("");
        interp.run(",").unwrap();
        assert_eq!(interp.primary.get(0), &Value::Text(String::new()));
    }

    #[test]
    fn test_conditional_runs_on_truthy() {
        let interp = run_ok("1((hi)!)?");
        assert_eq!(String::from_utf8(interp.into_output()).unwrap(), "hi\n");
    }

    #[test]
    fn test_conditional_skips_on_falsy() {
        let interp = run_ok("0((hi)!)?");
        assert!(interp.into_output().is_empty());
    }

    #[test]
    fn test_conditional_accepts_any_condition_variant() {
        let interp = run_ok("(x)((yes)!)?");
        assert_eq!(String::from_utf8(interp.into_output()).unwrap(), "yes\n");

        let interp = run_ok("()((no)!)?");
        assert!(interp.into_output().is_empty());
    }

    #[test]
    fn test_conditional_requires_two_items() {
        let fault = run_err("(x)?");
        assert_eq!(fault.kind, FaultKind::StackUnderflow(StackId::Primary));
    }

    #[test]
    fn test_loop_counts_down() {
        let interp = run_ok("5(:0>)(:!1-)@");
        assert_eq!(
            String::from_utf8(interp.into_output()).unwrap(),
            "5\n4\n3\n2\n1\n"
        );
    }

    #[test]
    fn test_loop_requires_text_bodies() {
        let fault = run_err("1(x)@");
        assert_eq!(
            fault.kind,
            FaultKind::TypeMismatch {
                ordinal: Ordinal::Second,
                expected: Expected::Text,
            }
        );
    }

    #[test]
    fn test_fault_inside_quotation_reports_quotation_text() {
        let fault = run_err("1(q)?");
        assert_eq!(fault.kind, FaultKind::InvalidInstruction('q'));
        assert_eq!(fault.program, "q");
        assert_eq!(fault.position, 0);
    }

    #[test]
    fn test_reset_clears_both_stacks() {
        let interp = run_ok("1 2 # 3 Ir");
        assert!(interp.primary.is_empty());
        assert!(interp.secondary.is_empty());
    }

    #[test]
    fn test_stack_size_instructions() {
        let interp = run_ok("7 7 IP 9 # IS");
        // IP saw two items; IS saw one item on secondary.
        assert_eq!(
            interp.primary.get(interp.primary.len() - 1),
            &Value::Int(1)
        );
        assert_eq!(
            interp.primary.get(interp.primary.len() - 2),
            &Value::Int(2)
        );
    }

    #[test]
    fn test_unknown_sub_instruction_names_the_sub_character() {
        let fault = run_err("Az");
        assert_eq!(fault.kind, FaultKind::InvalidInstruction('z'));
        assert_eq!(fault.position, 1);
    }

    #[test]
    fn test_prefix_at_end_of_program_names_the_prefix() {
        let fault = run_err("1 A");
        assert_eq!(fault.kind, FaultKind::InvalidInstruction('A'));
        assert_eq!(fault.position, 2);
    }

    #[test]
    fn test_invalid_instruction_position() {
        let fault = run_err("1 2 q");
        assert_eq!(fault.kind, FaultKind::InvalidInstruction('q'));
        assert_eq!(fault.position, 4);
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let mut a = machine("");
        let mut b = machine("");
        a.run("MR").unwrap();
        b.run("MR").unwrap();
        assert_eq!(a.primary.get(0), b.primary.get(0));
    }

    #[test]
    fn test_deeply_nested_quotations() {
        // 64 levels of `?` recursion through nested literals.
        let mut program = String::from("1!");
        for _ in 0..64 {
            program = format!("1({})?", program);
        }
        let interp = run_ok(&program);
        assert_eq!(String::from_utf8(interp.into_output()).unwrap(), "1\n");
    }
}
