use std::fs;

use anyhow::{bail, Context, Result};

use mofid::io::read_cif;
use mofid::{decompose, identify, simplify_net, BondingPolicy, IdentConfig, Structure};

use crate::cli::IdentifyArgs;
use crate::display::{
    print_record, print_structure_info, Context as DisplayContext, Progress,
};
use crate::io::{create_output, open_input, stdin_is_tty};

const TOTAL_STEPS: u8 = 3;

pub fn run_identify(args: IdentifyArgs, ctx: DisplayContext) -> Result<()> {
    if args.io.input.is_none() && stdin_is_tty() {
        bail!(
            "No input file specified and stdin is a terminal.\n\nUsage: mofid identify <INPUT.cif> or pipe data via stdin."
        );
    }

    let config = build_config(&args)?;
    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Reading structure");
    let structure = read_structure(&args)?;
    progress.complete_step(
        "Reading structure",
        &["Parse CIF file", "Convert fractional coordinates"],
    );

    if ctx.interactive {
        print_structure_info(&structure);
    }

    progress.step("Decomposing framework");
    let record = identify(&structure, &config).context("Identification failed")?;
    progress.complete_step(
        "Decomposing framework",
        &[
            "Perceive bonds and periodic images",
            "Partition nodes and linkers",
            "Canonicalize fragments",
            "Classify topology",
        ],
    );

    progress.step("Writing results");
    if let Some(path) = &args.cgd {
        let decomposition =
            decompose(&structure, &config).context("Net construction failed")?;
        let net = simplify_net(&decomposition.net);
        let mut writer = create_output(Some(path.as_path()))?;
        mofid::io::write_cgd(
            &mut writer,
            &net,
            &structure.cell,
            structure.name.as_deref(),
        )
        .with_context(|| format!("Failed to write CGD file: {}", path.display()))?;
    }
    print_record(&record);
    progress.complete_step("Writing results", &[]);

    progress.finish();
    Ok(())
}

fn build_config(args: &IdentifyArgs) -> Result<IdentConfig> {
    let read_table = |path: &Option<std::path::PathBuf>| -> Result<Option<String>> {
        match path {
            Some(p) => fs::read_to_string(p)
                .map(Some)
                .with_context(|| format!("Failed to read table file: {}", p.display())),
            None => Ok(None),
        }
    };

    Ok(IdentConfig {
        chem: read_table(&args.pipeline.chem)?,
        nets: read_table(&args.pipeline.nets)?,
        bonding: BondingPolicy {
            tolerance: args.pipeline.tolerance,
            ..Default::default()
        },
        capping: args.pipeline.capping.into(),
    })
}

fn read_structure(args: &IdentifyArgs) -> Result<Structure> {
    let input = open_input(args.io.input.as_deref())?;
    read_cif(input).context("Failed to read structure")
}
