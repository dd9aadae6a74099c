use anyhow::{Context, Result};
use chordscope::analyzer::{Category, ChordAnalyzer, ChordCandidate};
use chordscope::key::KeyContext;
use chordscope::melody::{MelodyAnalyzer, MelodyReport};
use chordscope::pitch::{parse_note, parse_notes, Pitch};
use chordscope::progression::ProgressionAnalyzer;
use chordscope::tables::Tables;
use chordscope::transition::{TransitionAnalyzer, TransitionReport};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chordscope", version, about = "Chord identification and harmony analyzer")]
struct Cli {
    /// Key context for spelling and degrees (e.g. C, Eb, F#m)
    #[arg(short, long, global = true)]
    key: Option<String>,

    /// Minimum candidate score, 0-100
    #[arg(short, long, global = true)]
    threshold: Option<i32>,

    /// Replacement chord-quality table (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    chords: Option<PathBuf>,

    /// Replacement cadence-rule table (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    cadences: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify a chord from a comma-separated note list
    Chord {
        /// Notes, e.g. "C4, E4, G4, Bb4" (octaves optional, inferred ascending)
        notes: String,

        /// Show every candidate instead of the best per category
        #[arg(long)]
        all: bool,
    },

    /// Analyze a chord progression, one note list per slot
    Progression {
        /// Note lists, e.g. "D3,F3,A3,C4" "G2,B3,D4,F4" "C3,E3,G3,B3"
        slots: Vec<String>,
    },

    /// Score the motion between two chords
    Transition {
        /// Note list of the first chord
        from: String,

        /// Note list of the second chord
        to: String,
    },

    /// Rate a melody note against a chord
    Melody {
        /// The melody note, e.g. "F4"
        note: String,

        /// Note list of the chord under it
        chord: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = chordscope::config::AppConfig::load();

    // Resolve key/threshold/tables: CLI > config > built-in
    let key_name = cli.key.unwrap_or_else(|| config.default_key.clone());
    let key = KeyContext::new(&key_name)
        .with_context(|| format!("Invalid key {key_name:?}"))?;
    let threshold = cli.threshold.unwrap_or(config.threshold);

    let chord_table = cli.chords.or(config.chord_table);
    let cadence_table = cli.cadences.or(config.cadence_table);
    let tables = Tables::with_overrides(chord_table.as_deref(), cadence_table.as_deref())
        .context("Failed to load table overrides")?;

    match cli.command {
        Commands::Chord { notes, all } => {
            let parsed = parse_notes(&notes, chordscope::DEFAULT_OCTAVE)
                .context("Failed to parse notes")?;
            let analysis = ChordAnalyzer::with_tables(&tables)
                .analyze(&parsed, &key)
                .context("No notes given")?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                return Ok(());
            }

            println!(
                "Input: {} (bass {}, {})",
                join_notes(&analysis.notes),
                analysis.bass_name,
                analysis.voicing
            );
            println!();

            if all {
                for category in Category::ALL {
                    let hits: Vec<&ChordCandidate> = analysis
                        .in_category(category)
                        .filter(|c| c.score >= threshold)
                        .collect();
                    if hits.is_empty() {
                        continue;
                    }
                    println!("{category}:");
                    for cand in hits {
                        println!("  {:>3}  {}", cand.score, cand.name);
                    }
                    println!();
                }
            } else {
                let ranked = analysis.ranked(threshold);
                if ranked.is_empty() {
                    println!("No interpretation scored {threshold} or higher.");
                    return Ok(());
                }
                for cand in ranked {
                    println!("{:>3}  {:<40} [{}]", cand.score, cand.name, cand.category);
                }
            }
        }

        Commands::Progression { slots } => {
            if slots.len() < 2 {
                anyhow::bail!("A progression needs at least two chords.");
            }
            let parsed: Vec<Vec<Pitch>> = slots
                .iter()
                .map(|s| parse_notes(s, chordscope::DEFAULT_OCTAVE))
                .collect::<Result<_, _>>()
                .context("Failed to parse notes")?;

            let report =
                ProgressionAnalyzer::with_tables(&tables).analyze(&parsed, &key, threshold);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("Progression in {} ({} chords):", report.key_name, report.steps.len());
            println!();
            for step in &report.steps {
                match &step.chord {
                    Some(chord) => println!(
                        "{:>3}. {:<40} [{}, score {}]",
                        step.index + 1,
                        chord.name,
                        chord.category,
                        chord.score
                    ),
                    None => println!(
                        "{:>3}. ({}) -- unresolved",
                        step.index + 1,
                        join_notes(&step.notes)
                    ),
                }
            }

            for transition in &report.transitions {
                println!();
                print_transition(transition);
            }
        }

        Commands::Transition { from, to } => {
            let notes_a = parse_notes(&from, chordscope::DEFAULT_OCTAVE)
                .context("Failed to parse first chord")?;
            let notes_b = parse_notes(&to, chordscope::DEFAULT_OCTAVE)
                .context("Failed to parse second chord")?;

            let analyzer = ChordAnalyzer::with_tables(&tables);
            let chord_a = analyzer
                .best_interpretation(&notes_a, &key, threshold)
                .with_context(|| format!("Could not identify {from:?} above score {threshold}"))?;
            let chord_b = analyzer
                .best_interpretation(&notes_b, &key, threshold)
                .with_context(|| format!("Could not identify {to:?} above score {threshold}"))?;

            let report = TransitionAnalyzer::with_tables(&tables).analyze(
                chord_a.root_pc,
                &chord_a.quality,
                &notes_a,
                chord_b.root_pc,
                &chord_b.quality,
                &notes_b,
                &key,
            );

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("{}  ->  {}", chord_a.name, chord_b.name);
            print_transition(&report);
        }

        Commands::Melody { note, chord } => {
            let melody = parse_note(&note, chordscope::DEFAULT_OCTAVE)
                .context("Failed to parse melody note")?;
            let chord_notes = parse_notes(&chord, chordscope::DEFAULT_OCTAVE)
                .context("Failed to parse chord notes")?;

            let identified = ChordAnalyzer::with_tables(&tables)
                .best_interpretation(&chord_notes, &key, threshold)
                .with_context(|| {
                    format!("Could not identify {chord:?} above score {threshold}")
                })?;

            let report = MelodyAnalyzer::with_tables(&tables).analyze(
                melody,
                identified.root_pc,
                &identified.quality,
                &chord_notes,
            );

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("Melody: {}  vs  Chord: {}", report.melody, identified.name);
            print_melody(&report);
        }
    }

    Ok(())
}

fn join_notes(notes: &[Pitch]) -> String {
    notes
        .iter()
        .map(Pitch::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print one transition report: degree motion, cadence, voice leading.
fn print_transition(report: &TransitionReport) {
    println!(
        "{} ({})  ->  {} ({})",
        report.chord_a, report.degree_a, report.chord_b, report.degree_b
    );
    println!(
        "Cadence: {} (+{})",
        report.cadence.primary.name, report.cadence.primary.bonus
    );
    for alt in &report.cadence.alternates {
        println!("  also: {} (+{})", alt.name, alt.bonus);
    }

    let vl = &report.voice_leading;
    println!(
        "Voice leading: smoothness {} ({} common, movement {})",
        vl.smoothness, vl.common_tones, vl.total_movement
    );
    for mv in &vl.moves {
        let from = mv.from.map(|p| p.to_string()).unwrap_or_else(|| "--".into());
        let to = mv.to.map(|p| p.to_string()).unwrap_or_else(|| "--".into());
        println!("  {from:<5} -> {to:<5} : {}", mv.movement_label());
    }
    println!("Total score: {}", report.score);
}

/// Print a melody commentary report.
fn print_melody(report: &MelodyReport) {
    println!("{}", "-".repeat(40));
    println!("Status: {}", report.status);

    if let Some(alert) = &report.theory_alert {
        println!("Theory Alert: {alert}");
    }
    if !report.acoustic_alerts.is_empty() {
        println!("Acoustic Alert: {}", report.acoustic_alerts.join(", "));
    }

    println!("Total Dissonance Score: {}", report.total_dissonance);
    println!("Acoustic Relationships (vs Chord Tones):");
    for rel in &report.relations {
        let (symbol, detail) = match (&rel.interval, &rel.ratio_name, rel.ratio) {
            (Some(iv), Some(name), Some((n, d))) => {
                (iv.to_string(), format!("({name}) [Ratio {n}:{d}]"))
            }
            (Some(iv), _, _) => (iv.to_string(), "(Unknown Ratio)".to_string()),
            _ => ("?".to_string(), "(no diatonic name)".to_string()),
        };
        let mut line = format!("  - vs {:<4} : {symbol:<3} {detail}", rel.chord_note.to_string());
        if rel.tolerated {
            line.push_str("  [harsh, allowed as a b9 tension]");
        } else if rel.warning {
            line.push_str("  [avoid: harsh dissonance]");
        }
        println!("{line}");
    }
}
