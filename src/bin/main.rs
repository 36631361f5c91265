use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;
use crossterm::{cursor, execute, terminal};
use dixan_core::bilingual::{build_category_relationship, build_paradigm_relationship, Relationship, RelationshipOptions};
use dixan_core::core::expansion::expand_paradigm;
use dixan_core::persistence::{export_json, load_corpus_frequencies, load_from_disk, save_to_disk};
use dixan_core::{dix, AnalyserConfig, AnalysisError, Dictionary, RankedCandidate, Ranker, ReviewSession, SuffixIndex};
use std::collections::{HashMap, HashSet};
use std::io::{stdin, stdout, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dixan")]
#[command(about = "Expand, relate and review paradigms of Apertium dictionaries")]
struct Cli {
    /// JSON config file; missing keys keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Expand dictionary entries, or one stem through one paradigm
    Expand(ExpandArgs),
    /// Infer the paradigm relationship between two monolingual dictionaries
    Relate(RelateArgs),
    /// Infer the lexical-category relationship of a bilingual dictionary
    Categories(CategoriesArgs),
    /// Rank (stem, paradigm) candidates for a word
    Candidates(CandidateArgs),
    /// Narrow the candidates for a word down by answering questions
    Review(ReviewArgs),
}

#[derive(Args)]
struct ExpandArgs {
    #[arg(short, long)]
    dictionary: PathBuf,
    /// Expand only this paradigm (requires --stem)
    #[arg(short, long, requires = "stem")]
    paradigm: Option<String>,
    #[arg(short, long)]
    stem: Option<String>,
    /// Append generation text and tags to each form
    #[arg(short, long)]
    lexical: bool,
    /// Print analysis:generation pairs instead of forms
    #[arg(long, conflicts_with = "paradigm")]
    pairs: bool,
    /// Direction labels whose alternatives are dropped in --pairs mode
    #[arg(long = "exclude-direction")]
    exclude_direction: Vec<String>,
}

#[derive(Args)]
struct RelationFlags {
    #[arg(long)]
    reverse: bool,
    #[arg(long)]
    remove_singletons: bool,
    #[arg(long)]
    remove_closed: bool,
    /// Write the relationship as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Write a binary snapshot for `candidates`/`review`
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

impl RelationFlags {
    fn options(&self) -> RelationshipOptions {
        RelationshipOptions {
            reverse: self.reverse,
            remove_singletons: self.remove_singletons,
            remove_closed_categories: self.remove_closed,
        }
    }
}

#[derive(Args)]
struct RelateArgs {
    #[arg(short, long)]
    bilingual: PathBuf,
    #[arg(short = 'L', long)]
    left: PathBuf,
    #[arg(short = 'R', long)]
    right: PathBuf,
    #[command(flatten)]
    flags: RelationFlags,
}

#[derive(Args)]
struct CategoriesArgs {
    #[arg(short, long)]
    bilingual: PathBuf,
    #[command(flatten)]
    flags: RelationFlags,
}

#[derive(Args)]
struct CandidateArgs {
    #[arg(short, long)]
    dictionary: PathBuf,
    #[arg(short, long)]
    word: String,
    /// Paradigm relationship snapshot written by `relate --snapshot`
    #[arg(long)]
    relationship: Option<PathBuf>,
    /// Paradigm of the word's translation; may be repeated
    #[arg(long = "source-paradigm")]
    source_paradigms: Vec<String>,
    /// Frequency list with `count word` lines
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Overrides `max_candidates` from the config
    #[arg(long)]
    limit: Option<usize>,
    /// Keep closed-category paradigms as candidates
    #[arg(long)]
    keep_closed: bool,
}

#[derive(Args)]
struct ReviewArgs {
    #[command(flatten)]
    candidates: CandidateArgs,
    /// Write the decisions and the solution as JSON
    #[arg(long)]
    log: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalyserConfig> {
    match path {
        Some(path) => AnalyserConfig::from_file(path)
            .with_context(|| format!("could not load config '{}'", path.display())),
        None => Ok(AnalyserConfig::default()),
    }
}

fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let dic = dix::read_file(path).with_context(|| format!("could not read '{}'", path.display()))?;
    dic.check_acyclic()?;
    Ok(dic)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Expand(args) => expand(args),
        Command::Relate(args) => relate(args, &config),
        Command::Categories(args) => categories(args, &config),
        Command::Candidates(args) => {
            let (dic, ranked) = rank_candidates(&args, &config)?;
            print_ranked(&dic, &ranked);
            Ok(())
        }
        Command::Review(args) => review(args, &config),
    }
}

fn expand(args: ExpandArgs) -> Result<()> {
    let dic = load_dictionary(&args.dictionary)?;
    let mut out = stdout().lock();

    if let (Some(paradigm), Some(stem)) = (&args.paradigm, &args.stem) {
        let forms = expand_paradigm(paradigm, stem, args.lexical, &dic)
            .ok_or_else(|| AnalysisError::UnknownParadigm(paradigm.clone()))?;
        for form in forms {
            writeln!(out, "{}+{};{}", paradigm, stem, form)?;
        }
        return Ok(());
    }

    let excluded: HashSet<String> = args.exclude_direction.iter().cloned().collect();
    let restriction = (!excluded.is_empty()).then_some(&excluded);
    for entry in dic.entries() {
        let lemma = entry.lemma.as_deref().unwrap_or("-");
        if args.pairs {
            for (analysis, generation) in dixan_core::expand_to_pairs(entry, &dic, restriction) {
                writeln!(out, "{}\t{}:{}", lemma, analysis, generation)?;
            }
        } else {
            for form in dixan_core::expand_to_forms(entry, args.lexical, &dic) {
                writeln!(out, "{}\t{}", lemma, form)?;
            }
        }
    }
    Ok(())
}

fn write_relationship(relationship: &Relationship, flags: &RelationFlags) -> Result<()> {
    if let Some(path) = &flags.snapshot {
        save_to_disk(relationship, path)?;
    }
    match &flags.output {
        Some(path) => export_json(relationship, path)?,
        None => {
            let mut out = stdout().lock();
            for source in relationship.sources() {
                if let Some(row) = relationship.get(source) {
                    for (target, score) in row {
                        writeln!(out, "{}\t{}\t{:.6}", source, target, score)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn relate(args: RelateArgs, config: &AnalyserConfig) -> Result<()> {
    let bilingual = load_dictionary(&args.bilingual)?;
    let left = load_dictionary(&args.left)?;
    let right = load_dictionary(&args.right)?;
    let relationship = build_paradigm_relationship(&bilingual, &left, &right, args.flags.options(), config);
    write_relationship(&relationship, &args.flags)
}

fn categories(args: CategoriesArgs, config: &AnalyserConfig) -> Result<()> {
    let bilingual = load_dictionary(&args.bilingual)?;
    let relationship = build_category_relationship(&bilingual, args.flags.options(), config);
    write_relationship(&relationship, &args.flags)
}

fn rank_candidates(args: &CandidateArgs, config: &AnalyserConfig) -> Result<(Dictionary, Vec<RankedCandidate>)> {
    let dic = load_dictionary(&args.dictionary)?;
    let closed = config.closed_categories();
    let index = SuffixIndex::build(&dic, (!args.keep_closed).then_some(&closed));
    let candidates = index.candidates_for(&args.word);
    if candidates.is_empty() {
        bail!("no paradigm in '{}' can generate '{}'", args.dictionary.display(), args.word);
    }

    let relationship: Option<Relationship> = match &args.relationship {
        Some(path) => Some(
            load_from_disk(path).with_context(|| format!("could not load relationship '{}'", path.display()))?,
        ),
        None => None,
    };
    let corpus: Option<HashMap<String, u64>> = match &args.corpus {
        Some(path) => Some(load_corpus_frequencies(path)?),
        None => None,
    };

    let mut ranker = Ranker::new(&dic, config.ranking.clone())
        .with_limit(args.limit.unwrap_or(config.max_candidates));
    if let Some(relationship) = &relationship {
        ranker = ranker.with_relationship(relationship);
    }
    if let Some(corpus) = &corpus {
        ranker = ranker.with_corpus(corpus);
    }
    let ranked = ranker.rank(candidates, &args.source_paradigms);
    tracing::info!(word = %args.word, candidates = ranked.len(), "candidates ranked");
    Ok((dic, ranked))
}

fn print_ranked(dic: &Dictionary, ranked: &[RankedCandidate]) {
    for (i, candidate) in ranked.iter().enumerate() {
        let lemma = candidate.candidate.lemma(dic).unwrap_or_default();
        println!("  {:>2}: {} {}", i + 1, candidate, lemma.dim());
    }
}

fn print_ui(session: &ReviewSession, form: &str, status: Option<&str>) -> Result<()> {
    let mut out = stdout();
    execute!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
    println!("{}", format!("Reviewing '{}'", session.word()).bold());
    println!("---------------------------------------------------------------");
    println!("[y] valid form  [n] invalid form  [b] go back  [q] quit\n");

    println!("Pending candidates:");
    for candidate in session.pending() {
        let forms = session.forms_of(&candidate.candidate).map_or(0, |forms| forms.len());
        println!("  {} ({} forms)", candidate.to_string().cyan(), forms);
    }
    println!("\nDecisions so far: {}", session.decisions().len());
    for decision in session.decisions() {
        let mark = if decision.is_rejected() { "no".red() } else { "yes".green() };
        println!("  {} {}", mark, decision.surface_form());
    }

    if let Some(status) = status {
        println!("\n{}", status.red());
    }
    print!("\nIs '{}' a valid word? > ", form.yellow().bold());
    out.flush()?;
    Ok(())
}

enum Answer {
    /// Keep asking; the message is shown under the next question.
    Continue(Option<String>),
    Quit,
}

fn apply_answer(session: &mut ReviewSession, form: &str, answer: &str) -> Answer {
    match answer {
        "y" | "yes" => {
            session.accept_form(form);
        }
        "n" | "no" => {
            session.reject_form(form);
        }
        "b" | "back" => {
            if session.go_back().is_none() {
                return Answer::Continue(Some("Nothing to undo.".to_string()));
            }
        }
        "q" | "quit" => return Answer::Quit,
        other => return Answer::Continue(Some(format!("Unknown answer '{}'.", other))),
    }
    Answer::Continue(None)
}

fn review(args: ReviewArgs, config: &AnalyserConfig) -> Result<()> {
    let (dic, ranked) = rank_candidates(&args.candidates, config)?;
    let mut session = ReviewSession::new(args.candidates.word.clone(), ranked, &dic);
    let mut lines = stdin().lock().lines();

    let mut status = None;
    while let Some(form) = session.next_form_to_ask().map(str::to_string) {
        print_ui(&session, &form, status.as_deref())?;
        let Some(line) = lines.next() else {
            break;
        };
        match apply_answer(&mut session, &form, line?.trim()) {
            Answer::Quit => break,
            Answer::Continue(message) => status = message,
        }
    }

    println!();
    match session.solution() {
        Some(solution) => {
            println!("{}", "Solution:".green().bold());
            print_ranked(&dic, solution);
        }
        None if session.pending().is_empty() => println!("{}", "No candidate survived.".red()),
        None => {
            println!("{}", "Review stopped; still pending:".yellow());
            print_ranked(&dic, session.pending());
        }
    }

    if let Some(path) = &args.log {
        export_json(&session, path)?;
        println!("Session written to '{}'", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dixan_core::{Candidate, Entry, Node, Paradigm, Side};

    fn session() -> ReviewSession {
        let mut dic = Dictionary::new();
        dic.add_paradigm(Paradigm::new(
            "N",
            vec![
                Entry::new(vec![Node::pair(Side::new("o"), Side::with_tags("o", ["n", "sg"]))]),
                Entry::new(vec![Node::pair(Side::new("os"), Side::with_tags("o", ["n", "pl"]))]),
            ],
        ));
        dic.add_paradigm(Paradigm::new(
            "Vb",
            vec![Entry::new(vec![Node::pair(Side::new("ar"), Side::with_tags("ar", ["vblex", "inf"]))])],
        ));
        let ranked = vec![
            RankedCandidate::new(Candidate::new("gat", "Vb"), 0.6),
            RankedCandidate::new(Candidate::new("gat", "N"), 0.4),
        ];
        ReviewSession::new("gato", ranked, &dic)
    }

    #[test]
    fn undo_with_no_decisions_reports_a_status() {
        let mut s = session();
        match apply_answer(&mut s, "gatar", "b") {
            Answer::Continue(Some(message)) => assert_eq!(message, "Nothing to undo."),
            _ => panic!("expected a status message"),
        }
    }

    #[test]
    fn unknown_answers_report_a_status_and_change_nothing() {
        let mut s = session();
        match apply_answer(&mut s, "gatar", "maybe") {
            Answer::Continue(Some(message)) => assert!(message.contains("maybe")),
            _ => panic!("expected a status message"),
        }
        assert!(s.decisions().is_empty());
    }

    #[test]
    fn answers_clear_the_status() {
        let mut s = session();
        assert!(matches!(apply_answer(&mut s, "gatar", "n"), Answer::Continue(None)));
        assert_eq!(s.pending().len(), 1);
        assert!(matches!(apply_answer(&mut s, "gato", "q"), Answer::Quit));
    }
}
