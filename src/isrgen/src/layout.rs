use crate::{Error, Result, asm::Register};

/// Width of a saved general-purpose register, in bytes.
pub const REGISTER_WIDTH: usize = 8;

/// Default save order of the general-purpose registers.
pub const DEFAULT_ORDER: [Register; 15] = [
    Register::R15,
    Register::R14,
    Register::R13,
    Register::R12,
    Register::R11,
    Register::R10,
    Register::R9,
    Register::R8,
    Register::Rax,
    Register::Rbx,
    Register::Rcx,
    Register::Rdx,
    Register::Rbp,
    Register::Rdi,
    Register::Rsi,
];

/// Describes the register save block: which registers are saved, and the byte
/// offset of each within the block.
///
/// Offsets are always `index * REGISTER_WIDTH`, so the slots form a bijection onto
/// `{0, 8, .., (n - 1) * 8}`. Every component that needs an offset or a block size
/// takes a `&RegisterLayout` rather than restating the numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterLayout {
    registers: Box<[Register]>,
}

impl RegisterLayout {
    /// Builds a layout from an explicit save order.
    ///
    /// The order must be a permutation of every general-purpose register except `rsp`.
    pub fn new(order: &[Register]) -> Result<Self> {
        let mut seen = Vec::with_capacity(order.len());

        for &register in order {
            if register == Register::Rsp {
                return Err(Error::UnsavableRegister(register));
            }

            if seen.contains(&register) {
                return Err(Error::DuplicateRegister(register));
            }

            seen.push(register);
        }

        if let Some(missing) =
            Register::ALL.into_iter().find(|register| *register != Register::Rsp && !seen.contains(register))
        {
            return Err(Error::MissingRegister(missing));
        }

        Ok(Self { registers: seen.into_boxed_slice() })
    }

    /// Registers in save order.
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Byte offset of `register` within the save block, if it's part of the block.
    pub fn offset(&self, register: Register) -> Option<usize> {
        self.registers.iter().position(|r| *r == register).map(|index| index * REGISTER_WIDTH)
    }

    /// Every register paired with its save-slot offset, in save order.
    pub fn slots(&self) -> impl ExactSizeIterator<Item = (Register, usize)> + '_ {
        self.registers.iter().enumerate().map(|(index, register)| (*register, index * REGISTER_WIDTH))
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Size of the whole save block, in bytes.
    pub fn size(&self) -> usize {
        self.len() * REGISTER_WIDTH
    }
}

impl Default for RegisterLayout {
    fn default() -> Self {
        Self { registers: Box::new(DEFAULT_ORDER) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_valid() {
        assert_eq!(RegisterLayout::new(&DEFAULT_ORDER).unwrap(), RegisterLayout::default());
    }

    #[test]
    fn default_block_is_fifteen_quadwords() {
        let layout = RegisterLayout::default();

        assert_eq!(layout.len(), 15);
        assert_eq!(layout.size(), 120);
        assert_eq!(layout.offset(Register::R15), Some(0));
        assert_eq!(layout.offset(Register::Rax), Some(64));
        assert_eq!(layout.offset(Register::Rsi), Some(112));
        assert_eq!(layout.offset(Register::Rsp), None);
    }

    #[test]
    fn offsets_are_a_bijection() {
        let layout = RegisterLayout::default();

        let mut offsets = layout.registers().iter().map(|r| layout.offset(*r).unwrap()).collect::<Vec<_>>();
        offsets.sort_unstable();

        let expected = (0..layout.len()).map(|index| index * REGISTER_WIDTH).collect::<Vec<_>>();
        assert_eq!(offsets, expected);
    }

    #[test]
    fn reordering_moves_offsets_consistently() {
        let mut order = DEFAULT_ORDER;
        order.reverse();
        let layout = RegisterLayout::new(&order).unwrap();

        assert_eq!(layout.offset(Register::Rsi), Some(0));
        assert_eq!(layout.offset(Register::R15), Some(112));
        assert!(layout.slots().all(|(register, offset)| layout.offset(register) == Some(offset)));
        assert_eq!(layout.size(), RegisterLayout::default().size());
    }

    #[test]
    fn rejects_bad_orders() {
        let mut duplicated = DEFAULT_ORDER;
        duplicated[1] = Register::R15;
        assert!(matches!(RegisterLayout::new(&duplicated), Err(Error::DuplicateRegister(Register::R15))));

        let mut with_rsp = DEFAULT_ORDER;
        with_rsp[0] = Register::Rsp;
        assert!(matches!(RegisterLayout::new(&with_rsp), Err(Error::UnsavableRegister(Register::Rsp))));

        assert!(matches!(RegisterLayout::new(&DEFAULT_ORDER[1..]), Err(Error::MissingRegister(Register::R15))));
        assert!(matches!(RegisterLayout::new(&[]), Err(Error::MissingRegister(_))));
    }
}
