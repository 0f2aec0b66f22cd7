//! Non-interactive driver for the backpropagation engine.
//!
//! Examples:
//!   bprop train XOR.NET XOR.PAT --seed 42 --ecrit 0.04 --save-weights XOR.WTS
//!   bprop train 424.NET 424.PAT --permuted --pattern-grain
//!   bprop test XOR.NET XOR.PAT --weights XOR.WTS
//!   bprop test XOR.NET XOR.PAT --snapshot run.img --pattern p01
//!
//! Reports are printed as JSON, one object per run, so results can be fed
//! to scripts.

use std::fs::File;
use std::process;

use serde_json::json;

use bprop::error::Result;
use bprop::network::{Grain, Network, PropagateMode};
use bprop::patterns::PatternPairs;
use bprop::spec::NetworkSpec;

fn print_help() {
    eprintln!("bprop - backpropagation network simulator");
    eprintln!("Usage: bprop <command> <net-file> <pattern-file> [options]\n");
    eprintln!("Commands:");
    eprintln!("  train    Train the network, then report per-pattern outputs");
    eprintln!("  test     Evaluate saved weights without learning");
    eprintln!("\nOptions:");
    eprintln!("  --seed N            Weight init seed (default 1)");
    eprintln!("  --permuted          Shuffle pattern order each epoch");
    eprintln!("  --pattern-grain     Update weights after every pattern");
    eprintln!("  --cascade           Settling (leaky integrator) propagation");
    eprintln!("  --epochs N          Override epoch count");
    eprintln!("  --lrate X           Learning rate (default 0.5)");
    eprintln!("  --momentum X        Momentum (default 0.9)");
    eprintln!("  --ecrit X           Early-stop total error criterion");
    eprintln!("  --tmax X            Clamp binary targets into [1-X, X]");
    eprintln!("  --save-weights F    Write legacy flat weight file after training");
    eprintln!("  --snapshot F        Write (train) or read (test) a model image");
    eprintln!("  --weights F         Read a legacy flat weight file (test)");
    eprintln!("  --pattern REF       Test one pattern by index or name prefix");
}

struct Options {
    net_file: String,
    pat_file: String,
    seed: u64,
    permuted: bool,
    pattern_grain: bool,
    cascade: bool,
    epochs: Option<usize>,
    lrate: Option<f64>,
    momentum: Option<f64>,
    ecrit: Option<f64>,
    tmax: Option<f64>,
    save_weights: Option<String>,
    snapshot: Option<String>,
    weights: Option<String>,
    pattern: Option<String>,
}

fn parse_options(args: &[String]) -> Option<Options> {
    let mut positional: Vec<&String> = Vec::new();
    let mut opts = Options {
        net_file: String::new(),
        pat_file: String::new(),
        seed: 1,
        permuted: false,
        pattern_grain: false,
        cascade: false,
        epochs: None,
        lrate: None,
        momentum: None,
        ecrit: None,
        tmax: None,
        save_weights: None,
        snapshot: None,
        weights: None,
        pattern: None,
    };

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--permuted" => opts.permuted = true,
            "--pattern-grain" => opts.pattern_grain = true,
            "--cascade" => opts.cascade = true,
            "--seed" => opts.seed = it.next()?.parse().ok()?,
            "--epochs" => opts.epochs = Some(it.next()?.parse().ok()?),
            "--lrate" => opts.lrate = Some(it.next()?.parse().ok()?),
            "--momentum" => opts.momentum = Some(it.next()?.parse().ok()?),
            "--ecrit" => opts.ecrit = Some(it.next()?.parse().ok()?),
            "--tmax" => opts.tmax = Some(it.next()?.parse().ok()?),
            "--save-weights" => opts.save_weights = Some(it.next()?.clone()),
            "--snapshot" => opts.snapshot = Some(it.next()?.clone()),
            "--weights" => opts.weights = Some(it.next()?.clone()),
            "--pattern" => opts.pattern = Some(it.next()?.clone()),
            _ if arg.starts_with("--") => return None,
            _ => positional.push(arg),
        }
    }

    if positional.len() != 2 {
        return None;
    }
    opts.net_file = positional[0].clone();
    opts.pat_file = positional[1].clone();
    Some(opts)
}

fn build_network(opts: &Options) -> Result<Network> {
    let spec = NetworkSpec::from_file(&opts.net_file)?;
    let mut net = Network::from_spec(spec, opts.seed);
    let pairs = PatternPairs::from_file(&opts.pat_file, net.ninputs, net.noutputs)?;
    net.load_patterns(pairs)?;

    if opts.pattern_grain {
        net.grain = Grain::Pattern;
    }
    if opts.cascade {
        net.mode = PropagateMode::Cascade;
    }
    if let Some(n) = opts.epochs {
        net.nepochs = n;
    }
    if let Some(v) = opts.lrate {
        net.lrate = v;
    }
    if let Some(v) = opts.momentum {
        net.momentum = v;
    }
    if let Some(v) = opts.ecrit {
        net.ecrit = v;
    }
    if let Some(v) = opts.tmax {
        net.tmax = v;
    }
    Ok(net)
}

fn pattern_report(net: &mut Network) -> Result<serde_json::Value> {
    let mut rows = Vec::new();
    for idx in 0..net.input_patterns.len() {
        net.test_pattern(&idx.to_string())?;
        rows.push(json!({
            "name": net.current_pattern_name(),
            "outputs": net.output_activations(),
            "pss": net.pss,
        }));
    }
    Ok(serde_json::Value::Array(rows))
}

fn cmd_train(opts: &Options) -> Result<()> {
    let mut net = build_network(opts)?;

    if opts.permuted {
        net.train_permuted()?;
    } else {
        net.train_sequential()?;
    }
    let trained_epochs = net.epochno;
    let final_tss = net.tss;

    if let Some(path) = &opts.save_weights {
        net.save_weights(path)?;
    }
    if let Some(path) = &opts.snapshot {
        let mut file = File::create(path)?;
        net.save_image_to(&mut file)?;
    }

    let report = json!({
        "command": "train",
        "seed": net.seed(),
        "epochs": trained_epochs,
        "tss": final_tss,
        "patterns": pattern_report(&mut net)?,
    });
    println!("{report:#}");
    Ok(())
}

fn cmd_test(opts: &Options) -> Result<()> {
    let mut net = match &opts.snapshot {
        Some(path) => {
            let mut file = File::open(path)?;
            let mut net = Network::load_image_from(&mut file)?;
            let pairs = PatternPairs::from_file(&opts.pat_file, net.ninputs, net.noutputs)?;
            net.load_patterns(pairs)?;
            net
        }
        None => build_network(opts)?,
    };
    if let Some(path) = &opts.weights {
        net.load_weights(path)?;
    }

    let (tss, patterns) = match &opts.pattern {
        Some(r) => {
            net.test_pattern(r)?;
            let row = json!([{
                "name": net.current_pattern_name(),
                "outputs": net.output_activations(),
                "pss": net.pss,
            }]);
            (net.pss, row)
        }
        None => {
            net.test_all()?;
            let tss = net.tss;
            (tss, pattern_report(&mut net)?)
        }
    };

    let report = json!({
        "command": "test",
        "tss": tss,
        "patterns": patterns,
    });
    println!("{report:#}");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        print_help();
        process::exit(2);
    }

    let command = args[0].as_str();
    if matches!(command, "--help" | "-h" | "help") {
        print_help();
        return;
    }

    let Some(opts) = parse_options(&args[1..]) else {
        print_help();
        process::exit(2);
    };

    let result = match command {
        "train" => cmd_train(&opts),
        "test" => cmd_test(&opts),
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
            process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
