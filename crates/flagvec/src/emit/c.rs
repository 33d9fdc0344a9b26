use std::fmt::Write as _;

use flagvec_alu::Width;

use crate::table::{VectorTable, CARRY_IN_MARKER};
use crate::Synthesis;

/// Renders the header and the two data sources as one stream.
///
/// Each logical file is bracketed by `// ##### BEGINFILE "<name>"` / `// ##### ENDFILE` so a
/// file splitter can break the stream apart. 64-bit tables go in their own source so they can be
/// placed in a different data segment.
pub fn render_c(synthesis: &Synthesis, prefix: &str) -> String {
    let mut out = String::new();
    let header_name = format!("{prefix}-data.h");

    // The splitter expects the stream to open with a blank line.
    out.push('\n');

    begin_file(&mut out, &header_name);
    let guard = format!("{}_DATA_H", c_ident(prefix).to_ascii_uppercase());
    let _ = writeln!(&mut out, "#ifndef {guard}");
    let _ = writeln!(&mut out, "#define {guard}");
    let _ = writeln!(&mut out);
    let _ = writeln!(&mut out, "#include <stdint.h>");
    let _ = writeln!(&mut out);
    let _ = writeln!(
        &mut out,
        "#define {}_FLAGS_CARRY_IN {CARRY_IN_MARKER:#06x}",
        c_ident(prefix).to_ascii_uppercase()
    );
    for width in Width::ALL {
        let _ = writeln!(&mut out);
        let _ = writeln!(&mut out, "typedef struct {}", vector_type(prefix, width));
        let _ = writeln!(&mut out, "{{");
        let ty = format!("uint{}_t", width.bits());
        let _ = writeln!(&mut out, "    {ty:<8} src1;");
        let _ = writeln!(&mut out, "    {ty:<8} src2;");
        let _ = writeln!(&mut out, "    {ty:<8} result;");
        let _ = writeln!(&mut out, "    {:<8} flags;", "uint16_t");
        let _ = writeln!(&mut out, "}} {}_t;", vector_type(prefix, width));
    }
    for table in &synthesis.tables {
        let _ = writeln!(&mut out);
        let _ = writeln!(
            &mut out,
            "extern const unsigned {};",
            count_symbol(prefix, table)
        );
        let _ = writeln!(
            &mut out,
            "extern const {}_t {}[];",
            vector_type(prefix, table.width),
            array_symbol(prefix, table)
        );
    }
    let _ = writeln!(&mut out);
    let _ = writeln!(&mut out, "#endif /* !{guard} */");
    end_file(&mut out);

    begin_file(&mut out, &format!("{prefix}-data16.c"));
    let _ = writeln!(&mut out, "#include \"{header_name}\"");
    for table in synthesis.tables.iter().filter(|t| t.width != Width::W64) {
        write_table(&mut out, prefix, table);
    }
    end_file(&mut out);

    begin_file(&mut out, &format!("{prefix}-data64.c"));
    let _ = writeln!(&mut out, "#include \"{header_name}\"");
    for table in synthesis.tables.iter().filter(|t| t.width == Width::W64) {
        write_table(&mut out, prefix, table);
    }
    end_file(&mut out);

    out
}

fn begin_file(out: &mut String, name: &str) {
    let _ = writeln!(out, "// ##### BEGINFILE \"{name}\"");
    let _ = writeln!(out, "/* {name} - generated by flagvec (do not edit). */");
    let _ = writeln!(out);
}

fn end_file(out: &mut String) {
    let _ = writeln!(out);
    let _ = writeln!(out, "// ##### ENDFILE");
}

fn write_table(out: &mut String, prefix: &str, table: &VectorTable) {
    let count = table.declared_len;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "const unsigned {} = {count};",
        count_symbol(prefix, table)
    );
    let _ = writeln!(
        out,
        "const {}_t {}[{count}] =",
        vector_type(prefix, table.width),
        array_symbol(prefix, table)
    );
    let _ = writeln!(out, "{{");

    // `0x` plus one digit per nibble.
    let digits = 2 + (table.width.bits() / 4) as usize;
    for section in &table.sections {
        if let Some(imm_bits) = section.variant.imm_bits() {
            let _ = writeln!(
                out,
                "    /* r/m{}, imm{imm_bits}: */",
                table.width.bits()
            );
        }
        for row in &section.rows {
            let _ = writeln!(
                out,
                "    {{ {:#0w$X}, {:#0w$X}, {:#0w$X}, {:#05X} }},",
                row.op1,
                row.op2,
                row.result,
                row.flags,
                w = digits
            );
        }
    }
    let _ = writeln!(out, "}};");
}

fn c_ident(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn vector_type(prefix: &str, width: Width) -> String {
    format!("{}_vector_u{}", c_ident(prefix), width.bits())
}

fn array_symbol(prefix: &str, table: &VectorTable) -> String {
    format!("{}_{}_u{}", c_ident(prefix), table.instr, table.width.bits())
}

fn count_symbol(prefix: &str, table: &VectorTable) -> String {
    format!("{}_count", array_symbol(prefix, table))
}
