use std::io::{
    Read,
    Write,
};

use anyhow::{
    anyhow,
    Context,
};
use csv::{
    QuoteStyle,
    ReaderBuilder,
    StringRecord,
    Terminator,
    WriterBuilder,
};
use itertools::Itertools;
use log::debug;

use crate::data_structs::{
    AnnotationRecord,
    Locus,
    LocusTable,
    RawGtfRecord,
};

const GTF_FIELDS: usize = 9;

pub struct GtfReader<R: Read> {
    inner: csv::Reader<R>,
}

impl<R: Read> GtfReader<R> {
    pub fn new(handle: R) -> Self {
        let inner = ReaderBuilder::default()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(handle);
        Self { inner }
    }

    pub fn records(&mut self) -> impl Iterator<Item = anyhow::Result<AnnotationRecord>> + '_ {
        self.inner.deserialize::<RawGtfRecord>().map(|raw| {
            let raw = raw.context("Failed to read GTF record")?;
            AnnotationRecord::try_from(raw)
        })
    }

    /// Raw rows, for inputs that are not plain GTF.
    pub fn rows(&mut self) -> impl Iterator<Item = anyhow::Result<StringRecord>> + '_ {
        self.inner
            .records()
            .map(|row| row.context("Failed to read row"))
    }
}

/// Reads every record of a GTF stream.
pub fn read_records<R: Read>(handle: R) -> anyhow::Result<Vec<AnnotationRecord>> {
    let records = GtfReader::new(handle)
        .records()
        .collect::<anyhow::Result<Vec<_>>>()?;
    debug!("Read {} GTF records", records.len());
    Ok(records)
}

fn record_from_fields(fields: &[&str]) -> anyhow::Result<AnnotationRecord> {
    fields.iter().join("\t").parse::<AnnotationRecord>()
}

/// Reads `bedtools intersect -wo` output pairing locus records with LTR
/// hits. The first nine fields are a record carrying a `locus` attribute,
/// the nine fields before the trailing overlap length are the LTR hit. The
/// returned LTR hits inherit the `locus` of their partner.
pub fn read_intersect_pairs<R: Read>(handle: R) -> anyhow::Result<Vec<AnnotationRecord>> {
    let mut reader = GtfReader::new(handle);
    let mut hits = Vec::new();
    for row in reader.rows() {
        let row = row?;
        let fields = row.iter().collect_vec();
        anyhow::ensure!(
            fields.len() > 2 * GTF_FIELDS,
            "Expected at least {} fields in intersect output, found {}",
            2 * GTF_FIELDS + 1,
            fields.len()
        );
        let anchor = record_from_fields(&fields[..GTF_FIELDS])?;
        let hit_end = fields.len() - 1;
        let mut hit = record_from_fields(&fields[hit_end - GTF_FIELDS..hit_end])?;
        let locus = anchor
            .locus()
            .ok_or_else(|| anyhow!("Intersect record {} has no locus", anchor.label()))?;
        hit.set_locus(&locus);
        hits.push(hit);
    }
    debug!("Read {} intersecting hits", hits.len());
    Ok(hits)
}

pub struct GtfWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> GtfWriter<W> {
    pub fn new(handle: W) -> Self {
        let inner = WriterBuilder::default()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(handle);
        Self { inner }
    }

    pub fn write_record(
        &mut self,
        record: &AnnotationRecord,
    ) -> anyhow::Result<()> {
        self.inner.serialize(RawGtfRecord::from(record))?;
        Ok(())
    }

    pub fn write_records<'a, I>(
        &mut self,
        records: I,
    ) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = &'a AnnotationRecord>, {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Header line, spanning record, then members by start.
    pub fn write_locus(
        &mut self,
        locus: &Locus,
    ) -> anyhow::Result<()> {
        self.inner
            .write_record([format!("### {} ###", locus.id())])?;
        self.write_records(locus.output_order())
    }

    /// Writes every locus of the table in emission order.
    pub fn write_table(
        &mut self,
        table: &LocusTable,
    ) -> anyhow::Result<()> {
        for locus in table.sorted() {
            self.write_locus(locus)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> anyhow::Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush GTF output: {}", e.error()))
    }
}
