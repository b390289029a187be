use std::fmt;

/// Adjacency representation of one edge relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SparseFormat {
    /// Coordinate list: one (source, destination) pair per edge.
    Coo,
    /// Compressed by source: outgoing edges grouped per source.
    Csr,
    /// Compressed by destination: incoming edges grouped per destination.
    Csc,
}

impl SparseFormat {
    pub const ALL: [SparseFormat; 3] = [SparseFormat::Coo, SparseFormat::Csr, SparseFormat::Csc];

    pub fn name(&self) -> &'static str {
        match self {
            SparseFormat::Coo => "COO",
            SparseFormat::Csr => "CSR",
            SparseFormat::Csc => "CSC",
        }
    }

    pub(crate) const fn slot(&self) -> usize {
        match self {
            SparseFormat::Coo => 0,
            SparseFormat::Csr => 1,
            SparseFormat::Csc => 2,
        }
    }

    const fn bit(&self) -> u8 {
        1 << self.slot()
    }
}

impl fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Small set of [`SparseFormat`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FormatSet(u8);

impl FormatSet {
    pub const EMPTY: FormatSet = FormatSet(0);
    pub const ALL: FormatSet = FormatSet(0b111);

    pub fn of(formats: &[SparseFormat]) -> Self {
        formats.iter().fold(Self::EMPTY, |set, f| set.with(*f))
    }

    pub const fn with(self, format: SparseFormat) -> Self {
        FormatSet(self.0 | format.bit())
    }

    pub fn contains(&self, format: SparseFormat) -> bool {
        self.0 & format.bit() != 0
    }

    pub fn intersect(&self, other: FormatSet) -> FormatSet {
        FormatSet(self.0 & other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = SparseFormat> {
        SparseFormat::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl fmt::Display for FormatSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(|f| f.name()).collect();
        f.write_str(&names.join(" and "))
    }
}
