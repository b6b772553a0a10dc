use crate::{Error, Result};
use core::fmt;

/// Number of vectors the generator emits entry stubs for.
pub const VECTOR_COUNT: usize = 128;

const _: () = assert!(VECTOR_COUNT <= u8::MAX as usize + 1);

/// Number of vectors reserved by the architecture for exceptions.
pub const EXCEPTION_COUNT: usize = 32;

/// Vectors for which the CPU pushes an error code before entering the handler.
pub const ERROR_CODE_VECTORS: [u8; 8] = [8, 10, 11, 12, 13, 14, 17, 30];

const DELIVERS_ERROR_CODE: [bool; VECTOR_COUNT] = {
    let mut table = [false; VECTOR_COUNT];

    let mut index = 0;
    while index < ERROR_CODE_VECTORS.len() {
        table[ERROR_CODE_VECTORS[index] as usize] = true;
        index += 1;
    }

    table
};

static EXCEPTION_NAMES: [Option<&str>; EXCEPTION_COUNT] = [
    Some("divide error"),
    Some("debug exception"),
    Some("non-maskable interrupt"),
    Some("breakpoint"),
    Some("overflow"),
    Some("bound range exceeded"),
    Some("invalid opcode"),
    Some("device not available"),
    Some("double fault"),
    Some("coprocessor segment overrun"),
    Some("invalid TSS"),
    Some("segment not present"),
    Some("stack-segment fault"),
    Some("general protection"),
    Some("page fault"),
    None,
    Some("x87 floating-point error"),
    Some("alignment check"),
    Some("machine check"),
    Some("SIMD floating-point exception"),
    Some("virtualization exception"),
    Some("control protection exception"),
    None,
    None,
    None,
    None,
    None,
    None,
    Some("hypervisor injection exception"),
    Some("VMM communication exception"),
    Some("security exception"),
    None,
];

/// An interrupt vector within the generated table, `0..VECTOR_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vector(u8);

impl Vector {
    pub fn new(vector: u16) -> Result<Self> {
        u8::try_from(vector)
            .ok()
            .filter(|vector| usize::from(*vector) < VECTOR_COUNT)
            .map(Self)
            .ok_or(Error::VectorOutOfRange(vector))
    }

    /// Every vector, in table order.
    pub fn all() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator {
        // `VECTOR_COUNT` fits in a `u8`.
        #[allow(clippy::cast_possible_truncation)]
        let count = VECTOR_COUNT as u8;

        (0..count).map(Self)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether the CPU pushes an error code when delivering this vector.
    pub const fn delivers_error_code(self) -> bool {
        DELIVERS_ERROR_CODE[self.index()]
    }

    /// Architectural name of the exception, for the vectors that have one.
    pub fn exception_name(self) -> Option<&'static str> {
        EXCEPTION_NAMES.get(self.index()).copied().flatten()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
