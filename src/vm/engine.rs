use crate::codon::{opcode_of, Codon};
use crate::config::VmConfig;
use crate::lexer::Token;
use crate::render::{Hsl, Renderer, Transform};
use crate::vm::op::Opcode;
use crate::vm::state::{HistoryEntry, VmState};
use log::{debug, info, trace, warn};
use thiserror::Error;

/// Default sandbox ceiling on dispatched instructions per run.
pub const DEFAULT_INSTRUCTION_LIMIT: usize = 10_000;

/// Literals span `[0, 64)`; drawing operands are this fraction of the surface width.
const LITERAL_RANGE: f64 = 64.0;
/// SCALE divides its operand by this, so a literal of 8 is the identity.
const SCALE_UNIT: f64 = 8.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VmError {
    #[error("Stack underflow at instruction {ip}: {opcode} needs more operands")]
    StackUnderflow { ip: usize, opcode: Opcode },
    #[error("Truncated program at instruction {ip}: PUSH is not followed by a literal codon")]
    TruncatedProgram { ip: usize },
    #[error("Division by zero at instruction {ip}")]
    DivisionByZero { ip: usize },
    #[error("Invalid LOOP parameters at instruction {ip}: count {count}, repeat {repeat}")]
    InvalidLoopParameters { ip: usize, count: i64, repeat: i64 },
    #[error("LOOP at instruction {ip} replays {count} instruction(s), only {available} available")]
    LoopWindowExceedsHistory {
        ip: usize,
        count: usize,
        available: usize,
    },
    #[error("RESTORE_STATE at instruction {ip} with no saved state")]
    EmptyStateStack { ip: usize },
    #[error("Instruction limit of {limit} exceeded at instruction {ip}")]
    InstructionLimit { ip: usize, limit: usize },
}

impl VmError {
    /// Token index that was executing when the error was raised.
    pub fn ip(&self) -> usize {
        match self {
            VmError::StackUnderflow { ip, .. }
            | VmError::TruncatedProgram { ip }
            | VmError::DivisionByZero { ip }
            | VmError::InvalidLoopParameters { ip, .. }
            | VmError::LoopWindowExceedsHistory { ip, .. }
            | VmError::EmptyStateStack { ip }
            | VmError::InstructionLimit { ip, .. } => *ip,
        }
    }
}

/// A fatal error together with the snapshots taken before it.
///
/// The partial timeline stays valid: it shows the program running up to
/// the faulting instruction.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error} (after {} snapshot(s))", .snapshots.len())]
pub struct RunFailure {
    #[source]
    pub error: VmError,
    pub snapshots: Vec<VmState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmStatus {
    /// Freshly reset.
    Ready,
    Running,
    /// STOP reached or tokens exhausted.
    Halted,
    Faulted,
}

/// Stack machine that executes codon tokens against a [`Renderer`].
///
/// One instance runs one program at a time; use separate instances for
/// concurrent runs.
pub struct VirtualMachine<R: Renderer> {
    renderer: R,
    state: VmState,
    instruction_limit: usize,
    seed: i64,
    status: VmStatus,
}

impl<R: Renderer> VirtualMachine<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_config(renderer, &VmConfig::default())
    }

    pub fn with_config(renderer: R, config: &VmConfig) -> Self {
        let transform = Transform::centered(renderer.width(), renderer.height());
        Self {
            renderer,
            state: VmState::new(transform, config.seed),
            instruction_limit: config.instruction_limit,
            seed: config.seed,
            status: VmStatus::Ready,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn state(&self) -> &VmState {
        &self.state
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    pub fn status(&self) -> VmStatus {
        self.status
    }

    /// Clears stack, counter, saved states and history, wipes the renderer
    /// and puts the cursor back in the centre of the surface.
    pub fn reset(&mut self) {
        self.renderer.clear();
        let centered = Transform::centered(self.renderer.width(), self.renderer.height());
        if self.renderer.current_transform() != centered {
            self.renderer.set_transform(centered);
        }
        self.state = VmState::new(centered, self.seed);
        self.status = VmStatus::Ready;
        debug!("VM reset");
    }

    /// Independent copy of the current state.
    pub fn snapshot(&self) -> VmState {
        self.state.clone()
    }

    /// Rewinds to `state`, re-applying its transform and colour to the renderer.
    ///
    /// The snapshot's own history replaces the machine's, so a following
    /// [`resume`](Self::resume) sees the same LOOP windows the original run
    /// did, whatever this machine ran in between.
    pub fn restore(&mut self, state: &VmState) {
        self.state = state.clone();
        self.renderer.set_transform(state.transform);
        let Hsl {
            hue,
            saturation,
            lightness,
        } = state.color;
        self.renderer.set_color(hue, saturation, lightness);
        self.status = VmStatus::Ready;
    }

    /// Resets and runs `tokens` until STOP, the end of the stream, or a fault.
    ///
    /// Returns one snapshot per executed instruction, including the final STOP.
    pub fn run(&mut self, tokens: &[Token]) -> Result<Vec<VmState>, RunFailure> {
        self.reset();
        self.resume(tokens)
    }

    /// Continues from the current instruction pointer without resetting.
    pub fn resume(&mut self, tokens: &[Token]) -> Result<Vec<VmState>, RunFailure> {
        self.status = VmStatus::Running;
        let mut snapshots = Vec::with_capacity(tokens.len().saturating_sub(self.state.ip));
        match self.execute_stream(tokens, &mut snapshots) {
            Ok(()) => {
                self.status = VmStatus::Halted;
                info!(
                    "Program halted after {} instruction(s), {} snapshot(s)",
                    self.state.instruction_count,
                    snapshots.len()
                );
                Ok(snapshots)
            }
            Err(error) => {
                self.status = VmStatus::Faulted;
                warn!("Program faulted: {}", error);
                Err(RunFailure { error, snapshots })
            }
        }
    }

    /// Executes one instruction outside of [`run`](Self::run).
    ///
    /// PUSH carries its literal in the following token, so it cannot be
    /// executed this way and fails with `TruncatedProgram`.
    pub fn execute(&mut self, opcode: Opcode, codon: Codon) -> Result<(), VmError> {
        if opcode == Opcode::Push {
            return Err(VmError::TruncatedProgram { ip: self.state.ip });
        }
        let entry = HistoryEntry::new(opcode, codon);
        if !matches!(opcode, Opcode::Loop | Opcode::Stop) {
            self.record(entry);
        }
        self.dispatch(&entry)
    }

    fn execute_stream(
        &mut self,
        tokens: &[Token],
        snapshots: &mut Vec<VmState>,
    ) -> Result<(), VmError> {
        let mut ip = self.state.ip;
        while ip < tokens.len() {
            self.state.ip = ip;
            let token = &tokens[ip];
            let opcode = opcode_of(token.codon);

            let next = match opcode {
                Opcode::Stop => {
                    snapshots.push(self.snapshot());
                    return Ok(());
                }
                Opcode::Push => {
                    let literal = tokens
                        .get(ip + 1)
                        .ok_or(VmError::TruncatedProgram { ip })?
                        .codon
                        .literal();
                    let entry = HistoryEntry::push(token.codon, literal);
                    self.record(entry);
                    self.dispatch(&entry)?;
                    ip + 2
                }
                _ => {
                    let entry = HistoryEntry::new(opcode, token.codon);
                    // LOOP stays out of history so replay windows never contain it.
                    if opcode != Opcode::Loop {
                        self.record(entry);
                    }
                    self.dispatch(&entry)?;
                    ip + 1
                }
            };

            self.state.ip = next;
            snapshots.push(self.snapshot());
            ip = next;
        }
        Ok(())
    }

    fn record(&mut self, entry: HistoryEntry) {
        self.state.history.push(entry);
    }

    /// Single entry point for executing an instruction, used by the main loop
    /// and by LOOP replay alike.
    fn dispatch(&mut self, entry: &HistoryEntry) -> Result<(), VmError> {
        self.tick()?;
        let ip = self.state.ip;
        let op = entry.opcode;
        trace!("[{}] {} ({})", ip, op, entry.codon);

        // Underflow is detected before anything is popped, so a faulting
        // instruction leaves the stack as it found it.
        if self.state.stack.len() < op.operands() {
            return Err(VmError::StackUnderflow { ip, opcode: op });
        }

        match op {
            Opcode::Start | Opcode::Stop | Opcode::Nop => {}
            Opcode::Push => {
                let value = entry.literal.ok_or(VmError::TruncatedProgram { ip })?;
                self.state.stack.push(value as i64);
            }

            Opcode::Circle => {
                let radius = self.pop_coordinate(op)?;
                self.renderer.circle(radius);
            }
            Opcode::Line => {
                let length = self.pop_coordinate(op)?;
                self.renderer.line(length);
            }
            Opcode::Triangle => {
                let size = self.pop_coordinate(op)?;
                self.renderer.triangle(size);
            }
            Opcode::Rect => {
                let height = self.pop_coordinate(op)?;
                let width = self.pop_coordinate(op)?;
                self.renderer.rect(width, height);
            }
            Opcode::Ellipse => {
                let ry = self.pop_coordinate(op)?;
                let rx = self.pop_coordinate(op)?;
                self.renderer.ellipse(rx, ry);
            }
            Opcode::Noise => {
                let intensity = self.pop_coordinate(op)?;
                let seed = self.pop(op)?;
                self.state.seed = seed;
                self.renderer.noise(seed, intensity);
            }

            Opcode::Translate => {
                let dy = self.pop_coordinate(op)?;
                let dx = self.pop_coordinate(op)?;
                self.renderer.translate(dx, dy);
                self.state.transform = self.renderer.current_transform();
            }
            Opcode::Rotate => {
                let degrees = self.pop(op)? as f64 * 360.0 / LITERAL_RANGE;
                self.renderer.rotate(degrees);
                self.state.transform = self.renderer.current_transform();
            }
            Opcode::Scale => {
                let factor = self.pop(op)? as f64 / SCALE_UNIT;
                self.renderer.scale(factor);
                self.state.transform = self.renderer.current_transform();
            }
            Opcode::Color => {
                let lightness = self.pop(op)? as f64 * 100.0 / LITERAL_RANGE;
                let saturation = self.pop(op)? as f64 * 100.0 / LITERAL_RANGE;
                let hue = self.pop(op)? as f64 * 360.0 / LITERAL_RANGE;
                self.renderer.set_color(hue, saturation, lightness);
                self.state.color = Hsl {
                    hue,
                    saturation,
                    lightness,
                };
            }

            Opcode::Dup => {
                let top = self.state.top().ok_or(VmError::StackUnderflow { ip, opcode: op })?;
                self.state.stack.push(top);
            }
            Opcode::Pop => {
                self.pop(op)?;
            }
            Opcode::Swap => {
                let b = self.pop(op)?;
                let a = self.pop(op)?;
                self.state.stack.push(b);
                self.state.stack.push(a);
            }

            Opcode::Add => self.apply_binary_op(op, |a, b| Ok(a.wrapping_add(b)))?,
            Opcode::Sub => self.apply_binary_op(op, |a, b| Ok(a.wrapping_sub(b)))?,
            Opcode::Mul => self.apply_binary_op(op, |a, b| Ok(a.wrapping_mul(b)))?,
            Opcode::Div => self.apply_binary_op(op, |a, b| {
                if b == 0 {
                    Err(VmError::DivisionByZero { ip })
                } else {
                    Ok(floor_div(a, b))
                }
            })?,
            Opcode::Eq => self.apply_binary_op(op, |a, b| Ok((a == b) as i64))?,
            Opcode::Lt => self.apply_binary_op(op, |a, b| Ok((a < b) as i64))?,

            Opcode::SaveState => {
                let saved = self.state.saved();
                self.state.state_stack.push(saved);
            }
            Opcode::RestoreState => {
                let saved = self
                    .state
                    .state_stack
                    .pop()
                    .ok_or(VmError::EmptyStateStack { ip })?;
                self.renderer.set_transform(saved.transform);
                let Hsl {
                    hue,
                    saturation,
                    lightness,
                } = saved.color;
                self.renderer.set_color(hue, saturation, lightness);
                self.state.transform = self.renderer.current_transform();
                self.state.color = saved.color;
            }

            Opcode::Loop => self.replay()?,
        }
        Ok(())
    }

    /// Pops repeat count, then instruction count, and re-dispatches the
    /// window of history that precedes the two PUSHes which supplied them.
    fn replay(&mut self) -> Result<(), VmError> {
        let ip = self.state.ip;
        let repeat = self.pop(Opcode::Loop)?;
        let count = self.pop(Opcode::Loop)?;
        if count < 0 || repeat < 0 {
            return Err(VmError::InvalidLoopParameters { ip, count, repeat });
        }

        let available = self.state.history.len().saturating_sub(2);
        let count = count as usize;
        if count > available {
            return Err(VmError::LoopWindowExceedsHistory {
                ip,
                count,
                available,
            });
        }
        if count == 0 || repeat == 0 {
            return Ok(());
        }

        let window = self.state.history[available - count..available].to_vec();
        debug!(
            "[{}] LOOP replaying {} instruction(s) x{}",
            ip, count, repeat
        );
        for _ in 0..repeat {
            for entry in &window {
                self.dispatch(entry)?;
            }
        }
        Ok(())
    }

    #[inline]
    fn tick(&mut self) -> Result<(), VmError> {
        self.state.instruction_count += 1;
        if self.state.instruction_count > self.instruction_limit {
            return Err(VmError::InstructionLimit {
                ip: self.state.ip,
                limit: self.instruction_limit,
            });
        }
        Ok(())
    }

    #[inline]
    fn pop(&mut self, opcode: Opcode) -> Result<i64, VmError> {
        self.state.stack.pop().ok_or(VmError::StackUnderflow {
            ip: self.state.ip,
            opcode,
        })
    }

    /// Pops a literal-scale value and maps it onto the surface width.
    #[inline]
    fn pop_coordinate(&mut self, opcode: Opcode) -> Result<f64, VmError> {
        let value = self.pop(opcode)?;
        Ok(value as f64 / LITERAL_RANGE * self.renderer.width())
    }

    /// Pops the right operand, then the left, and pushes `op(left, right)`.
    #[inline]
    fn apply_binary_op<F>(&mut self, opcode: Opcode, op: F) -> Result<(), VmError>
    where
        F: Fn(i64, i64) -> Result<i64, VmError>,
    {
        let b = self.pop(opcode)?;
        let a = self.pop(opcode)?;
        self.state.stack.push(op(a, b)?);
        Ok(())
    }
}

/// Integer division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}
