use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    batch::{Batch, ControlTotals},
    error::{ConsistencyError, Error, Result},
    file::File,
    iat_batch::IatBatch,
    record::BLOCKING_FACTOR,
};

/// Ceilings of one merged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeOpts {
    /// Entry and addenda records per file.
    pub max_entries: u64,
    /// Blocks of ten lines per file.
    pub max_blocks: u64,
    /// Ceiling of both the debit and the credit total, in cents.
    pub max_dollar_amount: Option<u64>,
}

impl Default for MergeOpts {
    fn default() -> Self {
        Self { max_entries: 99_999_999, max_blocks: 999_999, max_dollar_amount: None }
    }
}

/// Where one input batch ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Index of the input file.
    pub input: usize,
    /// Index of the batch within the input's batches, or IAT batches when
    /// `iat` is set.
    pub batch: usize,
    pub iat: bool,
    /// Index into [`Merged::files`].
    pub output: usize,
    /// Batch number assigned in the output file.
    pub batch_number: u32,
}

/// Result of [`merge_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub files: Vec<File>,
    pub manifest: Vec<Placement>,
}

/// Combines the batches of `files` into as few files as the ceilings allow.
///
/// Files are grouped by immediate destination and origin (ADV files apart
/// from the rest); each group is packed first-fit, so batches keep their
/// relative order inside every output. Batches are never split, and one
/// that alone exceeds a ceiling fails with [`ConsistencyError::MergeLimit`].
/// Output batches are renumbered from 1 and every output is created.
pub fn merge_files(files: &[File], opts: &MergeOpts) -> Result<Merged> {
    let mut outputs: Vec<Output> = Vec::new();
    let mut pending: Vec<Placement> = Vec::new();
    let mut positions: Vec<usize> = Vec::new();

    for (input, file) in files.iter().enumerate() {
        let key = GroupKey::of(file);
        let items = file
            .batches
            .iter()
            .enumerate()
            .map(|(i, b)| Item::Standard(i, b))
            .chain(file.iat_batches.iter().enumerate().map(|(i, b)| Item::Iat(i, b)));
        for item in items {
            let load = item.load();
            load.check(opts).map_err(|e| e.prefixed(&item.path(input)))?;
            let found = outputs.iter().position(|o| o.key == key && o.load.plus(&load).fits(opts));
            let slot = match found {
                Some(slot) => slot,
                None => {
                    outputs.push(Output::new(key.clone(), file));
                    outputs.len() - 1
                }
            };
            let position = outputs[slot].push(item, load);
            let (batch, iat) = item.index();
            pending.push(Placement { input, batch, iat, output: slot, batch_number: 0 });
            positions.push(position);
        }
    }

    let merged = outputs.into_iter().map(Output::finish).collect::<Result<Vec<_>>>()?;
    let mut manifest = pending;
    for (placement, position) in manifest.iter_mut().zip(positions) {
        let file = &merged[placement.output];
        placement.batch_number = if placement.iat {
            file.iat_batches[position].header().batch_number
        } else {
            file.batches[position].header().batch_number
        };
    }
    manifest.sort_by_key(|p| (p.input, p.iat, p.batch));
    debug!(inputs = files.len(), outputs = merged.len(), "files merged");
    Ok(Merged { files: merged, manifest })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupKey {
    destination: String,
    origin: String,
    adv: bool,
}

impl GroupKey {
    fn of(file: &File) -> Self {
        Self {
            destination: file.file_header.immediate_destination.clone(),
            origin: file.file_header.immediate_origin.clone(),
            adv: file.is_adv(),
        }
    }
}

#[derive(Clone, Copy)]
enum Item<'a> {
    Standard(usize, &'a Batch),
    Iat(usize, &'a IatBatch),
}

impl Item<'_> {
    fn load(&self) -> Load {
        let (totals, lines) = match self {
            Self::Standard(_, b) => (b.totals(), b.line_count()),
            Self::Iat(_, b) => (b.totals(), b.line_count()),
        };
        Load { totals, lines }
    }

    fn index(&self) -> (usize, bool) {
        match self {
            Self::Standard(i, _) => (*i, false),
            Self::Iat(i, _) => (*i, true),
        }
    }

    fn path(&self, input: usize) -> String {
        match self {
            Self::Standard(i, _) => format!("files[{input}].batches[{i}]"),
            Self::Iat(i, _) => format!("files[{input}].IATBatches[{i}]"),
        }
    }
}

/// Size of a file under construction.
#[derive(Debug, Clone, Copy, Default)]
struct Load {
    totals: ControlTotals,
    /// Batch lines, without the file header and control.
    lines: usize,
}

impl Load {
    fn plus(&self, other: &Self) -> Self {
        let mut totals = self.totals;
        totals.add_batch(&other.totals);
        Self { totals, lines: self.lines + other.lines }
    }

    fn blocks(&self) -> u64 {
        ((self.lines + 2).div_ceil(BLOCKING_FACTOR)) as u64
    }

    /// First ceiling this load exceeds, as `(limit, needed, max)`.
    fn exceeded(&self, opts: &MergeOpts) -> Option<(&'static str, u64, u64)> {
        if self.totals.entry_addenda_count > opts.max_entries {
            return Some(("entries", self.totals.entry_addenda_count, opts.max_entries));
        }
        if self.blocks() > opts.max_blocks {
            return Some(("blocks", self.blocks(), opts.max_blocks));
        }
        let max = opts.max_dollar_amount?;
        let amount = self.totals.total_debit.max(self.totals.total_credit);
        (amount > max).then_some(("dollar amount", amount, max))
    }

    fn fits(&self, opts: &MergeOpts) -> bool {
        self.exceeded(opts).is_none()
    }

    fn check(&self, opts: &MergeOpts) -> Result<()> {
        match self.exceeded(opts) {
            Some((limit, needed, max)) => Err(Error::consistency(
                "",
                ConsistencyError::MergeLimit { limit, needed, max },
            )),
            None => Ok(()),
        }
    }
}

struct Output {
    key: GroupKey,
    file: File,
    load: Load,
}

impl Output {
    fn new(key: GroupKey, template: &File) -> Self {
        let file = File::new(template.file_header.clone()).with_validation(*template.validation());
        Self { key, file, load: Load::default() }
    }

    /// Adds the batch and returns its index among the file's standard or
    /// IAT batches.
    fn push(&mut self, item: Item<'_>, load: Load) -> usize {
        self.load = self.load.plus(&load);
        match item {
            Item::Standard(_, batch) => {
                self.file.add_batch(batch.clone());
                self.file.batches.len() - 1
            }
            Item::Iat(_, batch) => {
                self.file.add_iat_batch(batch.clone());
                self.file.iat_batches.len() - 1
            }
        }
    }

    /// Renumbers the batches from 1, IAT batches last, and creates the file.
    fn finish(mut self) -> Result<File> {
        let mut next = 0u32;
        for batch in &mut self.file.batches {
            next += 1;
            batch.set_batch_number(next);
        }
        for batch in &mut self.file.iat_batches {
            next += 1;
            batch.set_batch_number(next);
        }
        self.file.create()?;
        Ok(self.file)
    }
}
