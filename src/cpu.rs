//! # CPU State and Execution
//!
//! The CPU struct representing a 6502-family processor and its
//! fetch-decode-execute loop.
//!
//! ## CPU State
//!
//! - **Registers**: Accumulator (A), index registers (X, Y)
//! - **Program counter** (PC): 16-bit address of the next instruction
//! - **Stack pointer** (SP): 8-bit offset into the stack page ($0100-$01FF)
//! - **Status register** (P): a [`Status`] byte
//! - **Cycle counter**: u64, monotonically increasing since reset
//! - **Interrupt state**: a latched NMI edge and a level-sensitive IRQ line
//!
//! ## Execution Model
//!
//! - [`CPU::step`] executes exactly one instruction (or services a pending
//!   interrupt) and returns the cycles it consumed
//! - [`CPU::execute`] steps until a cycle budget is met
//!
//! Interrupts are recognized at instruction boundaries with priority
//! RESET > NMI > IRQ. The bus is polled each boundary through
//! [`MemoryBus::irq_active`] / [`MemoryBus::nmi_active`], so memory-mapped
//! devices drive the lines without help from the caller.

use crate::status::Status;
use crate::{instructions, AddressingMode, CpuError, CpuVariant, MemoryBus};

/// NMI vector location.
pub const NMI_VECTOR: u16 = 0xFFFA;
/// RESET vector location.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ/BRK vector location.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// A per-instruction trace record handed to the trace callback just before
/// the instruction executes.
#[derive(Debug, Clone, Copy)]
pub struct TraceRecord {
    pub pc: u16,
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub status: u8,
    pub cycles: u64,
}

/// Per-instruction trace callback.
pub type TraceFn = Box<dyn FnMut(&TraceRecord) + Send>;

/// 6502 CPU state and execution context.
///
/// Generic over the memory implementation via the [`MemoryBus`] trait; the
/// variant parameter selects the opcode table and the handful of behaviors
/// where the family members diverge (JMP-indirect bug, decimal flags,
/// D on interrupt, CMOS opcodes).
///
/// # Examples
///
/// ```
/// use mos6502::{CPU, CpuVariant, FlatMemory, MemoryBus};
///
/// let mut mem = FlatMemory::new();
/// mem.write(0xFFFC, 0x00);
/// mem.write(0xFFFD, 0x80); // reset vector -> $8000
/// mem.write(0x8000, 0xA9); // LDA #$05
/// mem.write(0x8001, 0x05);
///
/// let mut cpu = CPU::new(mem, CpuVariant::Nmos6502);
/// assert_eq!(cpu.pc(), 0x8000);
/// assert_eq!(cpu.sp(), 0xFD);
///
/// let cycles = cpu.step().unwrap();
/// assert_eq!(cycles, 2);
/// assert_eq!(cpu.a(), 0x05);
/// ```
pub struct CPU<M: MemoryBus> {
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) pc: u16,
    pub(crate) sp: u8,
    pub(crate) status: Status,

    /// Total CPU cycles executed since reset.
    pub(crate) cycles: u64,

    pub(crate) variant: CpuVariant,

    /// Latched NMI edge, serviced at the next instruction boundary.
    pending_nmi: bool,
    /// Level asserted through [`CPU::irq`] (the bus line is polled
    /// separately).
    irq_line: bool,
    /// Previous sample of the bus NMI line, for edge detection.
    nmi_line_seen: bool,

    strict: bool,
    break_on_brk: bool,
    trace_fn: Option<TraceFn>,

    pub(crate) memory: M,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a CPU over the given bus and performs a reset.
    ///
    /// Reset state: PC loaded from the vector at $FFFC/$FFFD, SP = $FD,
    /// P = $24 (I and the unused bit set), A/X/Y zeroed, cycle counter
    /// zeroed, pending interrupts cleared.
    pub fn new(memory: M, variant: CpuVariant) -> Self {
        let mut cpu = Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            status: Status::reset(),
            cycles: 0,
            variant,
            pending_nmi: false,
            irq_line: false,
            nmi_line_seen: false,
            strict: false,
            break_on_brk: false,
            trace_fn: None,
            memory,
        };
        cpu.reset();
        cpu
    }

    /// Resets the CPU to its power-on state. RAM contents are the bus's
    /// business and survive.
    pub fn reset(&mut self) {
        self.pc = self.memory.read_word(RESET_VECTOR);
        self.sp = 0xFD;
        self.status = Status::reset();
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.cycles = 0;
        self.pending_nmi = false;
        self.irq_line = false;
        self.nmi_line_seen = false;
        log::debug!("reset: PC=${:04X} ({})", self.pc, self.variant);
    }

    /// Latches a non-maskable interrupt, serviced at the next instruction
    /// boundary regardless of the I flag.
    pub fn nmi(&mut self) {
        self.pending_nmi = true;
    }

    /// Asserts the IRQ line. Level-sensitive: stays asserted until
    /// [`CPU::release_irq`], and is serviced at each instruction boundary
    /// while `P.I` is clear.
    pub fn irq(&mut self) {
        self.irq_line = true;
    }

    /// Releases the IRQ line asserted via [`CPU::irq`].
    pub fn release_irq(&mut self) {
        self.irq_line = false;
    }

    /// Executes one instruction (or services a pending interrupt) and
    /// returns the cycles consumed.
    ///
    /// Errors only surface in the opt-in strict/testing modes; by default
    /// every opcode, documented or not, executes and consumes at least one
    /// cycle.
    pub fn step(&mut self) -> Result<u8, CpuError> {
        let start_cycles = self.cycles;

        // Edge-detect the bus NMI line, then service interrupts by priority.
        if self.memory.nmi_active() {
            if !self.nmi_line_seen {
                self.nmi_line_seen = true;
                self.pending_nmi = true;
            }
        } else {
            self.nmi_line_seen = false;
        }

        if self.pending_nmi {
            self.pending_nmi = false;
            self.service_interrupt(NMI_VECTOR);
            log::debug!("NMI serviced, PC=${:04X}", self.pc);
            return Ok((self.cycles - start_cycles) as u8);
        }

        if (self.irq_line || self.memory.irq_active()) && !self.status.contains(Status::IRQ_DISABLE)
        {
            self.service_interrupt(IRQ_VECTOR);
            log::debug!("IRQ serviced, PC=${:04X}", self.pc);
            return Ok((self.cycles - start_cycles) as u8);
        }

        let pc = self.pc;
        let opcode = self.memory.read(pc);
        let metadata = &self.variant.table()[opcode as usize];

        if self.trace_fn.is_some() || log::log_enabled!(log::Level::Trace) {
            let record = TraceRecord {
                pc,
                opcode,
                mnemonic: metadata.mnemonic,
                a: self.a,
                x: self.x,
                y: self.y,
                sp: self.sp,
                status: self.status_byte(),
                cycles: self.cycles,
            };
            log::trace!(
                "${:04X}  {:02X} {:4} A:{:02X} X:{:02X} Y:{:02X} SP:{:02X} P:{:02X} CYC:{}",
                record.pc,
                record.opcode,
                record.mnemonic,
                record.a,
                record.x,
                record.y,
                record.sp,
                record.status,
                record.cycles
            );
            if let Some(trace) = self.trace_fn.as_mut() {
                trace(&record);
            }
        }

        match metadata.mnemonic {
            "ADC" => instructions::alu::execute_adc(self, opcode)?,
            "AND" => instructions::alu::execute_and(self, opcode)?,
            "ASL" => instructions::shifts::execute_asl(self, opcode)?,
            "BCC" => instructions::branches::execute_bcc(self, opcode)?,
            "BCS" => instructions::branches::execute_bcs(self, opcode)?,
            "BEQ" => instructions::branches::execute_beq(self, opcode)?,
            "BIT" => instructions::alu::execute_bit(self, opcode)?,
            "BMI" => instructions::branches::execute_bmi(self, opcode)?,
            "BNE" => instructions::branches::execute_bne(self, opcode)?,
            "BPL" => instructions::branches::execute_bpl(self, opcode)?,
            "BRA" => instructions::branches::execute_bra(self, opcode)?,
            "BRK" => instructions::control::execute_brk(self, opcode)?,
            "BVC" => instructions::branches::execute_bvc(self, opcode)?,
            "BVS" => instructions::branches::execute_bvs(self, opcode)?,
            "BBR" => instructions::cmos::execute_bbr(self, opcode)?,
            "BBS" => instructions::cmos::execute_bbs(self, opcode)?,
            "CLC" => instructions::flags::execute_clc(self, opcode)?,
            "CLD" => instructions::flags::execute_cld(self, opcode)?,
            "CLI" => instructions::flags::execute_cli(self, opcode)?,
            "CLV" => instructions::flags::execute_clv(self, opcode)?,
            "CMP" => instructions::alu::execute_cmp(self, opcode)?,
            "CPX" => instructions::alu::execute_cpx(self, opcode)?,
            "CPY" => instructions::alu::execute_cpy(self, opcode)?,
            "DEC" => instructions::inc_dec::execute_dec(self, opcode)?,
            "DEX" => instructions::inc_dec::execute_dex(self, opcode)?,
            "DEY" => instructions::inc_dec::execute_dey(self, opcode)?,
            "EOR" => instructions::alu::execute_eor(self, opcode)?,
            "INC" => instructions::inc_dec::execute_inc(self, opcode)?,
            "INX" => instructions::inc_dec::execute_inx(self, opcode)?,
            "INY" => instructions::inc_dec::execute_iny(self, opcode)?,
            "JMP" => instructions::control::execute_jmp(self, opcode)?,
            "JSR" => instructions::control::execute_jsr(self, opcode)?,
            "LDA" => instructions::load_store::execute_lda(self, opcode)?,
            "LDX" => instructions::load_store::execute_ldx(self, opcode)?,
            "LDY" => instructions::load_store::execute_ldy(self, opcode)?,
            "LSR" => instructions::shifts::execute_lsr(self, opcode)?,
            "NOP" => instructions::control::execute_nop(self, opcode)?,
            "ORA" => instructions::alu::execute_ora(self, opcode)?,
            "PHA" => instructions::stack::execute_pha(self, opcode)?,
            "PHP" => instructions::stack::execute_php(self, opcode)?,
            "PHX" => instructions::stack::execute_phx(self, opcode)?,
            "PHY" => instructions::stack::execute_phy(self, opcode)?,
            "PLA" => instructions::stack::execute_pla(self, opcode)?,
            "PLP" => instructions::stack::execute_plp(self, opcode)?,
            "PLX" => instructions::stack::execute_plx(self, opcode)?,
            "PLY" => instructions::stack::execute_ply(self, opcode)?,
            "RMB" => instructions::cmos::execute_rmb(self, opcode)?,
            "ROL" => instructions::shifts::execute_rol(self, opcode)?,
            "ROR" => instructions::shifts::execute_ror(self, opcode)?,
            "RTI" => instructions::control::execute_rti(self, opcode)?,
            "RTS" => instructions::control::execute_rts(self, opcode)?,
            "SBC" => instructions::alu::execute_sbc(self, opcode)?,
            "SEC" => instructions::flags::execute_sec(self, opcode)?,
            "SED" => instructions::flags::execute_sed(self, opcode)?,
            "SEI" => instructions::flags::execute_sei(self, opcode)?,
            "SMB" => instructions::cmos::execute_smb(self, opcode)?,
            "STA" => instructions::load_store::execute_sta(self, opcode)?,
            "STX" => instructions::load_store::execute_stx(self, opcode)?,
            "STY" => instructions::load_store::execute_sty(self, opcode)?,
            "STZ" => instructions::load_store::execute_stz(self, opcode)?,
            "TAX" => instructions::transfer::execute_tax(self, opcode)?,
            "TAY" => instructions::transfer::execute_tay(self, opcode)?,
            "TSX" => instructions::transfer::execute_tsx(self, opcode)?,
            "TXA" => instructions::transfer::execute_txa(self, opcode)?,
            "TXS" => instructions::transfer::execute_txs(self, opcode)?,
            "TYA" => instructions::transfer::execute_tya(self, opcode)?,
            "???" => instructions::control::execute_undocumented(self, opcode)?,
            other => unreachable!("opcode table lists unknown mnemonic {other}"),
        }

        Ok((self.cycles - start_cycles) as u8)
    }

    /// Steps until at least `max_cycles` cycles have been consumed and
    /// returns the exact count.
    ///
    /// The instruction in flight when the budget runs out always completes,
    /// so the return value may exceed the budget by up to one instruction's
    /// cost. With strict mode on, that overshoot is reported as
    /// [`CpuError::CycleExhaustion`] instead - a testing aid for verifying
    /// cycle accounting. CPU state is identical either way.
    pub fn execute(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        while self.cycles - start_cycles < max_cycles {
            self.step()?;
        }
        let consumed = self.cycles - start_cycles;
        if self.strict && consumed > max_cycles {
            return Err(CpuError::CycleExhaustion {
                budget: max_cycles,
                consumed,
            });
        }
        Ok(consumed)
    }

    fn service_interrupt(&mut self, vector: u16) {
        let pc = self.pc;
        self.push((pc >> 8) as u8);
        self.push((pc & 0xFF) as u8);
        self.push(self.status.to_pushed(false));
        self.status.insert(Status::IRQ_DISABLE);
        if self.variant.is_cmos() {
            self.status.remove(Status::DECIMAL);
        }
        self.pc = self.memory.read_word(vector);
        self.cycles += 7;
    }

    // ========== Configuration ==========

    /// Strict mode: undefined opcodes raise [`CpuError::InvalidOpcode`] and
    /// [`CPU::execute`] overshoot raises [`CpuError::CycleExhaustion`].
    /// Off by default.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    /// When enabled, BRK completes its interrupt sequence and then returns
    /// [`CpuError::Break`]. Off by default.
    pub fn set_break_on_brk(&mut self, enabled: bool) {
        self.break_on_brk = enabled;
    }

    pub(crate) fn break_on_brk(&self) -> bool {
        self.break_on_brk
    }

    /// Installs (or clears) the per-instruction trace callback.
    pub fn set_trace_fn(&mut self, trace: Option<TraceFn>) {
        self.trace_fn = trace;
    }

    // ========== Register Access ==========

    /// Returns the accumulator.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Returns the X index register.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Returns the Y index register.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Returns the program counter.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Returns the stack pointer. The full stack address is $0100 + SP.
    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Returns the CPU variant.
    pub fn variant(&self) -> CpuVariant {
        self.variant
    }

    /// Returns the status register as a packed byte (NV-BDIZC, bit 5
    /// reading as 1, B always 0 in the live register).
    pub fn status_byte(&self) -> u8 {
        (self.status | Status::UNUSED).bits()
    }

    /// Returns the status register.
    pub fn status(&self) -> Status {
        self.status | Status::UNUSED
    }

    /// Total cycles executed since reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn flag_n(&self) -> bool {
        self.status.contains(Status::NEGATIVE)
    }

    pub fn flag_v(&self) -> bool {
        self.status.contains(Status::OVERFLOW)
    }

    pub fn flag_d(&self) -> bool {
        self.status.contains(Status::DECIMAL)
    }

    pub fn flag_i(&self) -> bool {
        self.status.contains(Status::IRQ_DISABLE)
    }

    pub fn flag_z(&self) -> bool {
        self.status.contains(Status::ZERO)
    }

    pub fn flag_c(&self) -> bool {
        self.status.contains(Status::CARRY)
    }

    // ========== Register Setters (tests and harnesses) ==========

    pub fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    pub fn set_x(&mut self, value: u8) {
        self.x = value;
    }

    pub fn set_y(&mut self, value: u8) {
        self.y = value;
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    pub fn set_sp(&mut self, value: u8) {
        self.sp = value;
    }

    pub fn set_flag_n(&mut self, value: bool) {
        self.status.set(Status::NEGATIVE, value);
    }

    pub fn set_flag_v(&mut self, value: bool) {
        self.status.set(Status::OVERFLOW, value);
    }

    pub fn set_flag_d(&mut self, value: bool) {
        self.status.set(Status::DECIMAL, value);
    }

    pub fn set_flag_i(&mut self, value: bool) {
        self.status.set(Status::IRQ_DISABLE, value);
    }

    pub fn set_flag_z(&mut self, value: bool) {
        self.status.set(Status::ZERO, value);
    }

    pub fn set_flag_c(&mut self, value: bool) {
        self.status.set(Status::CARRY, value);
    }

    /// Returns a reference to the memory bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Returns a mutable reference to the memory bus.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Consumes the CPU, returning the memory bus.
    pub fn into_memory(self) -> M {
        self.memory
    }

    // ========== Helpers for Instruction Implementations ==========

    /// Pushes a byte; SP wraps modulo 256 silently.
    pub(crate) fn push(&mut self, value: u8) {
        self.memory.write(0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Pops a byte; SP wraps modulo 256 silently.
    pub(crate) fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.memory.read(0x0100 | self.sp as u16)
    }

    /// Sets N and Z from a result byte and returns it unchanged.
    pub(crate) fn set_nz(&mut self, value: u8) -> u8 {
        self.status.set(Status::ZERO, value == 0);
        self.status.set(Status::NEGATIVE, value & 0x80 != 0);
        value
    }

    /// Resolves the effective address for `mode`, with the operand bytes at
    /// PC+1. Returns `(address, page_crossed)`; the caller charges the
    /// page-cross cycle only where the opcode table says so.
    pub(crate) fn operand_address(&mut self, mode: AddressingMode) -> (u16, bool) {
        match mode {
            AddressingMode::ZeroPage => {
                let addr = self.memory.read(self.pc.wrapping_add(1)) as u16;
                (addr, false)
            }
            AddressingMode::ZeroPageX => {
                let base = self.memory.read(self.pc.wrapping_add(1));
                (base.wrapping_add(self.x) as u16, false)
            }
            AddressingMode::ZeroPageY => {
                let base = self.memory.read(self.pc.wrapping_add(1));
                (base.wrapping_add(self.y) as u16, false)
            }
            AddressingMode::Absolute => {
                let lo = self.memory.read(self.pc.wrapping_add(1)) as u16;
                let hi = self.memory.read(self.pc.wrapping_add(2)) as u16;
                ((hi << 8) | lo, false)
            }
            AddressingMode::AbsoluteX => {
                let lo = self.memory.read(self.pc.wrapping_add(1)) as u16;
                let hi = self.memory.read(self.pc.wrapping_add(2)) as u16;
                let base = (hi << 8) | lo;
                let addr = base.wrapping_add(self.x as u16);
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }
            AddressingMode::AbsoluteY => {
                let lo = self.memory.read(self.pc.wrapping_add(1)) as u16;
                let hi = self.memory.read(self.pc.wrapping_add(2)) as u16;
                let base = (hi << 8) | lo;
                let addr = base.wrapping_add(self.y as u16);
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }
            AddressingMode::IndirectX => {
                let zp = self.memory.read(self.pc.wrapping_add(1)).wrapping_add(self.x);
                let lo = self.memory.read(zp as u16) as u16;
                let hi = self.memory.read(zp.wrapping_add(1) as u16) as u16;
                ((hi << 8) | lo, false)
            }
            AddressingMode::IndirectY => {
                let zp = self.memory.read(self.pc.wrapping_add(1));
                let lo = self.memory.read(zp as u16) as u16;
                let hi = self.memory.read(zp.wrapping_add(1) as u16) as u16;
                let base = (hi << 8) | lo;
                let addr = base.wrapping_add(self.y as u16);
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }
            AddressingMode::ZeroPageIndirect => {
                let zp = self.memory.read(self.pc.wrapping_add(1));
                let lo = self.memory.read(zp as u16) as u16;
                let hi = self.memory.read(zp.wrapping_add(1) as u16) as u16;
                ((hi << 8) | lo, false)
            }
            _ => unreachable!("addressing mode {mode:?} has no effective address"),
        }
    }

    /// Reads the operand value for `mode`. Returns `(value, page_crossed)`.
    pub(crate) fn operand_value(&mut self, mode: AddressingMode) -> (u8, bool) {
        match mode {
            AddressingMode::Immediate => {
                let value = self.memory.read(self.pc.wrapping_add(1));
                (value, false)
            }
            _ => {
                let (addr, crossed) = self.operand_address(mode);
                (self.memory.read(addr), crossed)
            }
        }
    }
}
