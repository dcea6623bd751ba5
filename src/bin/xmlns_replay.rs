use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use indoc::indoc;
use log::Level;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use xmlns_writer::script::WriteScript;
use xmlns_writer::{NonRepairingWriter, WriterSettings, WriterState, XmlByteSink};

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

struct XmlnsReplay {
    input: Option<PathBuf>,
    output: Box<dyn Write>,
    settings: WriterSettings,
    verbosity_level: Option<Level>,
}

impl XmlnsReplay {
    pub fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let input = match matches
            .get_one::<String>("INPUT")
            .map(String::as_str)
        {
            None | Some("-") => None,
            Some(path) => Some(PathBuf::from(path)),
        };

        let output: Box<dyn Write> = match matches.get_one::<String>("output-target") {
            Some(path) => Box::new(BufWriter::new(Self::create_output_file(path)?)),
            None => Box::new(BufWriter::new(io::stdout())),
        };

        let settings = WriterSettings::new()
            .check_names(matches.get_flag("check-names"))
            .automatic_empty_elements(!matches.get_flag("no-auto-empty"));

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(Level::Info),
            2 => Some(Level::Debug),
            3 => Some(Level::Trace),
            _ => {
                eprintln!("using more than -vvv does not affect verbosity level");
                Some(Level::Trace)
            }
        };

        Ok(XmlnsReplay {
            input,
            output,
            settings,
            verbosity_level,
        })
    }

    fn create_output_file(path: impl AsRef<Path>) -> Result<File> {
        let p = path.as_ref();

        if p.is_dir() {
            bail!(
                "There is a directory at {}, refusing to overwrite",
                p.display()
            );
        }

        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        File::create(p).with_context(|| format!("Failed to create {}", p.display()))
    }

    fn read_script(&self) -> Result<WriteScript> {
        let mut json = String::new();
        match &self.input {
            Some(path) => {
                File::open(path)
                    .with_context(|| format!("Failed to open file {}", path.display()))?
                    .read_to_string(&mut json)?;
            }
            None => {
                io::stdin().read_to_string(&mut json)?;
            }
        }
        Ok(WriteScript::from_json(&json)?)
    }

    /// Main entry point for `XmlnsReplay`
    pub fn run(self) -> Result<()> {
        self.try_to_initialize_logging();

        let script = self.read_script()?;
        let mut writer = NonRepairingWriter::with_settings(XmlByteSink::new(self.output), self.settings);
        script.apply(&mut writer)?;

        if writer.state() != WriterState::Ended {
            writer.write_end_document()?;
        }

        let mut output = writer.into_sink().into_inner();
        writeln!(output)?;
        output.flush()?;
        Ok(())
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level {
            match TermLogger::init(
                level.to_level_filter(),
                Config::default(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            ) {
                Ok(_) => {}
                Err(e) => eprintln!("Failed to initialize logging: {:?}", e),
            };
        }
    }
}

fn command() -> Command {
    Command::new("xmlns_replay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Replays a JSON write script through the non-repairing XML writer")
        .long_about(indoc!(r#"
            Replays a JSON write script through the non-repairing XML writer.

            The script is a JSON array of operations tagged by `op`, for example:

                [{"op": "start_element", "local": "root"},
                 {"op": "namespace", "prefix": "p", "uri": "urn:x"},
                 {"op": "empty_element", "uri": "urn:x", "local": "child"}]

            Namespace URIs are never repaired: writing a name whose URI has no
            visible binding fails. Elements still open when the script ends are
            closed automatically.
        "#))
        .arg(
            Arg::new("INPUT")
                .help("Path to the JSON script, `-` (or nothing) reads from stdin."),
        )
        .arg(
            Arg::new("output-target")
                .long("output")
                .short('f')
                .action(ArgAction::Set)
                .help("Writes output to the file specified instead of stdout, errors will still be printed to stderr. \
                       Will create parent directories if needed."),
        )
        .arg(
            Arg::new("check-names")
                .long("check-names")
                .action(ArgAction::SetTrue)
                .help("When set, element, attribute and prefix names are validated."),
        )
        .arg(
            Arg::new("no-auto-empty")
                .long("no-auto-empty")
                .action(ArgAction::SetTrue)
                .help("When set, elements without content are written as `<a></a>`."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("-v - info, -vv - debug, -vvv - trace."),
        )
}

fn main() {
    let matches = command().get_matches();

    let result = XmlnsReplay::from_cli_matches(&matches).and_then(XmlnsReplay::run);
    if let Err(e) = result {
        eprintln!("{:#}", e);
        exit(1);
    }
}
