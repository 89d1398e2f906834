use console::Style;
use stitchprep_core::pipeline::config::StitchConfig;
use stitchprep_core::pipeline::PipelineOutput;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn on_off(s: &Styles, enabled: bool) -> String {
    if enabled {
        s.method.apply_to("on").to_string()
    } else {
        s.disabled.apply_to("off").to_string()
    }
}

// Summaries go to stderr; stdout carries only the parameter path.
pub fn print_config_summary(config: &StitchConfig) {
    let s = Styles::new();

    eprintln!();
    eprintln!("  {}", s.title.apply_to("Stitch Preparation"));
    eprintln!("  {}", s.title.apply_to("\u{2550}".repeat(18)));
    eprintln!();
    eprintln!(
        "  {:<14}{}",
        s.label.apply_to("Data"),
        s.path.apply_to(config.data_folder.display())
    );
    eprintln!(
        "  {:<14}{}",
        s.label.apply_to("Results"),
        s.path.apply_to(config.results_folder.display())
    );
    match config.data_root {
        Some(ref root) => eprintln!(
            "  {:<14}{}",
            s.label.apply_to("Tiles"),
            s.path.apply_to(root)
        ),
        None => eprintln!(
            "  {:<14}{}",
            s.label.apply_to("Tiles"),
            s.disabled.apply_to("from capsule documents")
        ),
    }
    eprintln!();

    let reg = &config.registration;
    eprintln!("  {}", s.header.apply_to("Registration"));
    match reg.downsample {
        Some(level) => eprintln!(
            "    {:<12}{}",
            s.label.apply_to("Downsample"),
            s.value.apply_to(format!("{level} (fixed)"))
        ),
        None => eprintln!(
            "    {:<12}{}",
            s.label.apply_to("Target"),
            s.value.apply_to(format!(
                "{} x {} x {}",
                reg.target_resolution[0], reg.target_resolution[1], reg.target_resolution[2]
            ))
        ),
    }
    let p = &config.parameters;
    eprintln!(
        "    {:<12}{}",
        s.label.apply_to("Min corr."),
        s.value.apply_to(p.min_correlation)
    );
    eprintln!(
        "    {:<12}phase correlation {}, detection {}, registrations {}",
        s.label.apply_to("Steps"),
        on_off(&s, p.do_phase_correlation),
        on_off(&s, p.do_detection),
        on_off(&s, p.do_registrations)
    );
    eprintln!();
}

pub fn print_run_summary(output: &PipelineOutput) {
    let s = Styles::new();
    let pc = &output.parameters.phase_correlation_params;

    eprintln!();
    eprintln!("  {}", s.header.apply_to("Result"));
    eprintln!(
        "    {:<12}{}",
        s.label.apply_to("Dataset"),
        s.value.apply_to(&output.dataset_name)
    );
    eprintln!(
        "    {:<12}{}",
        s.label.apply_to("Channel"),
        s.value.apply_to(output.channel)
    );
    eprintln!(
        "    {:<12}{}",
        s.label.apply_to("Tiles"),
        s.value.apply_to(output.tile_count)
    );
    eprintln!(
        "    {:<12}{}",
        s.label.apply_to("Storage"),
        s.path.apply_to(&output.storage_root)
    );
    let source = if output.downsample_overridden {
        "fixed"
    } else {
        "estimated"
    };
    eprintln!(
        "    {:<12}{} {}",
        s.label.apply_to("Downsample"),
        s.value.apply_to(pc.downsample),
        s.label.apply_to(format!("({source})"))
    );
    eprintln!(
        "    {:<12}{} px",
        s.label.apply_to("Max shift"),
        s.value.apply_to(pc.max_shift_in_x)
    );
    eprintln!(
        "    {:<12}{}",
        s.label.apply_to("Parallel"),
        s.value.apply_to(output.parameters.parallel)
    );
    eprintln!(
        "    {:<12}{}",
        s.label.apply_to("Descriptor"),
        s.path.apply_to(output.paths.descriptor.display())
    );
    eprintln!();
}
