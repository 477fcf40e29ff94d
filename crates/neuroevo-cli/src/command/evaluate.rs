use std::path::PathBuf;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Champion JSON written by `train`
    model_path: PathBuf,
    /// Comma separated observation; without it every case of the model's task is run
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    input: Option<Vec<f64>>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg { model_path, input } = arg;
    let model = util::read_champion_file(model_path)?;
    let agent = model.to_agent();
    let input_size = model.network.layer_sizes()[0];

    if let Some(input) = input {
        anyhow::ensure!(
            input.len() == input_size,
            "expected {input_size} input values, got {}",
            input.len()
        );
        let output = agent.act(input);
        println!("{output:.4?}");
        return Ok(());
    }

    let cases = model.task.cases();
    println!("Model: {} ({})", model.name, model.trained_at);
    println!("Final fitness: {:.4}", model.final_fitness);
    println!();
    println!("{:<24} {:>8} {:>8}", "Input", "Target", "Output");
    for (input, target) in &cases {
        let output = agent.act(input)[0];
        println!("{:<24} {target:>8.1} {output:>8.4}", format!("{input:?}"));
    }
    println!();
    println!("Fitness: {:.4}", model.task.fitness(&agent));

    Ok(())
}
