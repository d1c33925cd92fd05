//! Decoded, immutable programs

use core::fmt;

use log::debug;

use crate::error::DecodeError;
use crate::ids::ProgramId;
use crate::instruction::Instruction;
use crate::opcode::{InstructionSet, Opcode};

/// Record header: code byte and argument length byte
pub const HEADER_LEN: usize = 2;

/// One record and the byte offset it starts at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub offset: usize,
    pub instruction: Instruction,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}  {}", self.offset, self.instruction)
    }
}

impl Record {
    pub fn opcode(&self) -> Opcode {
        self.instruction.opcode()
    }
}

/// A maker's program, decoded eagerly against one instruction set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    id: ProgramId,
    bytes: Vec<u8>,
    records: Vec<Record>,
}

impl Program {
    /// Decode every record and validate jump targets
    ///
    /// Rejects unknown codes, truncated records, malformed arguments (even in
    /// unreachable code), jumps off a record boundary and conditional jumps
    /// that do not go strictly forward.
    pub fn decode(id: ProgramId, bytes: &[u8], set: &InstructionSet) -> Result<Self, DecodeError> {
        let mut records = Vec::new();
        let mut offset = 0usize;

        while offset < bytes.len() {
            if offset + HEADER_LEN > bytes.len() {
                return Err(DecodeError::Truncated { offset });
            }
            let code = bytes[offset];
            let len = bytes[offset + 1] as usize;
            let opcode = set
                .decode(code)
                .ok_or(DecodeError::UnknownOpcode { code, offset })?;
            let start = offset + HEADER_LEN;
            let args = bytes
                .get(start..start + len)
                .ok_or(DecodeError::Truncated { offset })?;
            let instruction = Instruction::decode(opcode, args, offset)?;
            records.push(Record { offset, instruction });
            offset = start + len;
        }

        let program = Self {
            id,
            bytes: bytes.to_vec(),
            records,
        };

        for record in &program.records {
            if let Some((target, conditional)) = record.instruction.jump_target() {
                program.index_of(target as usize)?;
                if conditional && (target as usize) <= record.offset {
                    return Err(DecodeError::BackwardConditionalJump { offset: record.offset });
                }
            }
        }

        debug!(
            "decoded program {} ({} records, {} bytes, set {})",
            id,
            program.records.len(),
            program.bytes.len(),
            set.name()
        );
        Ok(program)
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record index starting at byte `offset`; the end of the program is a valid target
    pub fn index_of(&self, offset: usize) -> Result<usize, DecodeError> {
        if offset == self.bytes.len() {
            return Ok(self.records.len());
        }
        self.records
            .binary_search_by_key(&offset, |r| r.offset)
            .map_err(|_| DecodeError::InvalidJumpTarget { target: offset })
    }

    /// One line per record: `0x0000  static_balances USDC=100 WETH=200`
    pub fn disassemble(&self) -> String {
        self.records.iter().map(|record| format!("{}\n", record)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::write_u16;

    fn record(set: &InstructionSet, ins: &Instruction) -> Vec<u8> {
        let args = ins.encode_args();
        let mut out = vec![set.encode(ins.opcode()).unwrap(), args.len() as u8];
        out.extend_from_slice(&args);
        out
    }

    #[test]
    fn test_decode_offsets() {
        let set = InstructionSet::v1();
        let mut bytes = record(&set, &Instruction::Deadline { deadline: 5 });
        bytes.extend(record(&set, &Instruction::XycSwap));
        let program = Program::decode(ProgramId::default(), &bytes, &set).unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.records()[1].offset, 10);
        assert_eq!(program.index_of(10).unwrap(), 1);
        assert_eq!(program.index_of(12).unwrap(), 2);
        assert!(program.index_of(3).is_err());
    }

    #[test]
    fn test_disassemble_one_line_per_record() {
        let set = InstructionSet::v1();
        let mut bytes = record(&set, &Instruction::Deadline { deadline: 5 });
        bytes.extend(record(&set, &Instruction::XycSwap));
        let program = Program::decode(ProgramId::default(), &bytes, &set).unwrap();
        assert_eq!(program.records()[1].to_string(), "0x000a  xyc_swap");
        assert_eq!(program.disassemble(), "0x0000  deadline 5\n0x000a  xyc_swap\n");
    }

    #[test]
    fn test_unknown_and_truncated() {
        let set = InstructionSet::v1();
        assert_eq!(
            Program::decode(ProgramId::default(), &[200, 0], &set),
            Err(DecodeError::UnknownOpcode { code: 200, offset: 0 })
        );
        assert_eq!(
            Program::decode(ProgramId::default(), &[3], &set),
            Err(DecodeError::Truncated { offset: 0 })
        );
        // Length byte claims more than is present
        assert_eq!(
            Program::decode(ProgramId::default(), &[3, 8, 0, 0], &set),
            Err(DecodeError::Truncated { offset: 0 })
        );
    }

    #[test]
    fn test_jump_validation() {
        let set = InstructionSet::v1();
        // Jump into the middle of its own record
        let mut bytes = vec![set.encode(Opcode::Jump).unwrap(), 2];
        write_u16(&mut bytes, 1);
        assert_eq!(
            Program::decode(ProgramId::default(), &bytes, &set),
            Err(DecodeError::InvalidJumpTarget { target: 1 })
        );

        // Conditional jump to itself
        let asset = "A".parse().unwrap();
        let bytes = record(&set, &Instruction::JumpIfAssetIn { asset, target: 0 });
        assert_eq!(
            Program::decode(ProgramId::default(), &bytes, &set),
            Err(DecodeError::BackwardConditionalJump { offset: 0 })
        );

        // Unconditional backward jump is fine
        let bytes = record(&set, &Instruction::Jump { target: 0 });
        assert!(Program::decode(ProgramId::default(), &bytes, &set).is_ok());
    }

    #[test]
    fn test_stateless_set_rejects_state_code() {
        let v1 = InstructionSet::v1();
        let bytes = record(&v1, &Instruction::Extruction {
            target: Default::default(),
            payload: vec![],
        });
        assert!(Program::decode(ProgramId::default(), &bytes, &InstructionSet::stateless()).is_err());
    }
}
