use crate::{
    Error, Result,
    asm::{Line, Symbol},
    stub::EntryStub,
    vector::Vector,
};

/// The entry stubs for every vector, indexed by vector number.
#[derive(Debug, Clone)]
pub struct VectorTable {
    stubs: Vec<EntryStub>,
}

impl VectorTable {
    /// Builds one stub per vector, each labeled `<prefix><vector>` and jumping to `target`.
    pub fn build(prefix: &str, target: &Symbol) -> Result<Self> {
        let stubs = Vector::all().map(|vector| EntryStub::new(vector, prefix, target)).collect::<Result<Vec<_>>>()?;

        if let Some(stub) = stubs.iter().find(|stub| stub.label() == target) {
            return Err(Error::DuplicateSymbol(stub.label().to_string()));
        }

        debug!(
            "built {} entry stubs ({} with hardware error codes)",
            stubs.len(),
            stubs.iter().filter(|stub| stub.vector().delivers_error_code()).count()
        );

        Ok(Self { stubs })
    }

    pub fn stubs(&self) -> &[EntryStub] {
        &self.stubs
    }

    #[cfg(test)]
    pub(crate) fn stub(&self, vector: Vector) -> &EntryStub {
        &self.stubs[vector.index()]
    }

    /// Stub labels in vector order.
    pub fn labels(&self) -> impl ExactSizeIterator<Item = &Symbol> {
        self.stubs.iter().map(EntryStub::label)
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.stubs.iter().flat_map(|stub| stub.lines())
    }
}
