use serde::Serialize;

use crate::report::variant_label;
use crate::table::TestVector;
use crate::Synthesis;

#[derive(Serialize)]
struct JsonArtifact<'a> {
    seed: u64,
    tables: Vec<JsonTable<'a>>,
}

#[derive(Serialize)]
struct JsonTable<'a> {
    instr: &'a str,
    bits: u32,
    count: usize,
    sections: Vec<JsonSection<'a>>,
}

#[derive(Serialize)]
struct JsonSection<'a> {
    variant: &'static str,
    rows: &'a [TestVector],
}

pub fn render_json(synthesis: &Synthesis) -> serde_json::Result<String> {
    let artifact = JsonArtifact {
        seed: synthesis.seed,
        tables: synthesis
            .tables
            .iter()
            .map(|table| JsonTable {
                instr: table.instr,
                bits: table.width.bits(),
                count: table.declared_len,
                sections: table
                    .sections
                    .iter()
                    .map(|section| JsonSection {
                        variant: variant_label(section.variant),
                        rows: &section.rows,
                    })
                    .collect(),
            })
            .collect(),
    };

    let mut out = serde_json::to_string_pretty(&artifact)?;
    out.push('\n');
    Ok(out)
}
