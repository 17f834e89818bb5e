use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context as _};
use colored::Colorize;
use serde_json::Value;
use vstore_client::{Clientset, StoreError, TypedClient};
use vstore_codec::{CodecFactory, MEDIA_TYPE_JSON};
use vstore_types::{ConfigSet, Context, Resource, SchemaVersion, Widget};
use vstore_vfs::VfsContext;

use crate::cli::*;
use crate::config::{CliConfig, Settings};

/// Everything a subcommand needs, built once from the merged settings.
struct Session {
    clients: Clientset,
    codec: CodecFactory,
    ctx: Context,
    format: OutputFormat,
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let file = CliConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, file)?;
    let session = open_session(&cli, &settings)?;
    dispatch(&session, cli.command)
}

fn dispatch(session: &Session, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Get(args) => cmd_get(session, args),
        Command::Create(args) => cmd_apply(session, &args.file, Mode::Create),
        Command::Replace(args) => cmd_apply(session, &args.file, Mode::Replace),
        Command::Delete(args) => cmd_delete(session, args),
    }
}

fn open_session(cli: &Cli, settings: &Settings) -> anyhow::Result<Session> {
    let root = VfsContext::new()
        .build_path(&settings.state)
        .with_context(|| format!("opening state store {:?}", settings.state))?;
    tracing::debug!(state = %root, owner = %settings.owner.name, "opened state store");

    // A missing serializer is a build-time mistake; give up here.
    let clients = Clientset::with_owner(root.backend, root.path, &settings.store, settings.owner.clone())
        .context("configuring store clients")?;

    let ctx = match cli.timeout {
        Some(secs) => Context::background().with_timeout(Duration::from_secs(secs)),
        None => Context::background(),
    };
    Ok(Session {
        clients,
        codec: CodecFactory::default(),
        ctx,
        format: cli.format,
    })
}

// ---------------------------------------------------------------------------
// get
// ---------------------------------------------------------------------------

fn cmd_get(session: &Session, args: GetArgs) -> anyhow::Result<()> {
    match args.kind {
        ResourceKind::Widget => get_kind(session, session.clients.widgets(), args.name, print_widget),
        ResourceKind::ConfigSet => {
            get_kind(session, session.clients.config_sets(), args.name, print_config_set)
        }
    }
}

fn get_kind<T: Resource>(
    session: &Session,
    client: &TypedClient<T>,
    name: Option<String>,
    print_text: fn(&T),
) -> anyhow::Result<()> {
    let items = match name {
        Some(name) => match client.get(&session.ctx, &name)? {
            Some(item) => vec![item],
            None => bail!("{} {:?} not found", T::KIND, name),
        },
        None => client.list(&session.ctx)?,
    };

    match session.format {
        OutputFormat::Json => {
            let docs = items
                .iter()
                .map(|item| to_document(&session.codec, item))
                .collect::<anyhow::Result<Vec<_>>>()?;
            println!("{}", serde_json::to_string_pretty(&Value::Array(docs))?);
        }
        OutputFormat::Text if items.is_empty() => {
            println!("No {} resources found.", T::KIND);
        }
        OutputFormat::Text => items.iter().for_each(print_text),
    }
    Ok(())
}

/// Render a resource as the self-describing document it is stored as.
fn to_document<T: Resource>(codec: &CodecFactory, item: &T) -> anyhow::Result<Value> {
    let json = codec
        .serializer_for_media_type(MEDIA_TYPE_JSON)
        .context("json serializer is not registered")?;
    let bytes = codec
        .encoder_for_version(json, SchemaVersion::default())
        .encode(item)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn created(item: &impl Resource) -> String {
    item.metadata()
        .creation_timestamp
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "-".into())
}

fn print_widget(w: &Widget) {
    println!(
        "{}  image={}  replicas={}  created={}",
        w.name().bold(),
        w.spec.image.cyan(),
        w.spec.replicas.to_string().yellow(),
        created(w).dimmed()
    );
}

fn print_config_set(cs: &ConfigSet) {
    println!("{}  created={}", cs.name().bold(), created(cs).dimmed());
    for (key, value) in &cs.data {
        println!("  {} = {}", key.cyan(), value);
    }
}

// ---------------------------------------------------------------------------
// create / replace
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Replace,
}

fn cmd_apply(session: &Session, file: &Path, mode: Mode) -> anyhow::Result<()> {
    let raw = read_input(file)?;
    let docs = split_documents(&raw).with_context(|| format!("reading {}", file.display()))?;
    if docs.is_empty() {
        bail!("{} contains no documents", file.display());
    }

    for doc in docs {
        let bytes = serde_json::to_vec(&doc)?;
        let meta = session.codec.decode_type_meta(&bytes)?;
        if meta.kind == Widget::KIND {
            apply_one(session, session.clients.widgets(), &bytes, mode)?;
        } else if meta.kind == ConfigSet::KIND {
            apply_one(session, session.clients.config_sets(), &bytes, mode)?;
        } else {
            bail!("unsupported kind {:?}", meta.kind);
        }
    }
    Ok(())
}

fn apply_one<T: Resource>(
    session: &Session,
    client: &TypedClient<T>,
    bytes: &[u8],
    mode: Mode,
) -> anyhow::Result<()> {
    let (item, version) = session.codec.decode::<T>(bytes)?;
    tracing::debug!(kind = T::KIND, name = item.name(), %version, "decoded input document");

    let result = match mode {
        Mode::Create => client.create(&session.ctx, &item),
        Mode::Replace => client.update(&session.ctx, &item),
    };
    match result {
        Ok(_) => {
            let verb = if mode == Mode::Create { "created" } else { "replaced" };
            println!("{} {} {} {}", "✓".green().bold(), T::KIND, item.name().bold(), verb);
            Ok(())
        }
        Err(e @ StoreError::AlreadyExists { .. }) => {
            Err(e).with_context(|| format!("{} {:?} already exists; use `vstore replace`", T::KIND, item.name()))
        }
        Err(e @ StoreError::PreconditionFailed { .. }) => {
            Err(e).with_context(|| format!("{} {:?} does not exist; use `vstore create`", T::KIND, item.name()))
        }
        Err(e) => Err(e.into()),
    }
}

fn read_input(file: &Path) -> anyhow::Result<String> {
    if file == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
    }
}

/// A file holds one document, a JSON array of documents, or a stream of
/// concatenated documents.
fn split_documents(text: &str) -> anyhow::Result<Vec<Value>> {
    let mut docs = Vec::new();
    for value in serde_json::Deserializer::from_str(text).into_iter::<Value>() {
        match value? {
            Value::Array(items) => docs.extend(items),
            other => docs.push(other),
        }
    }
    Ok(docs)
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

fn cmd_delete(session: &Session, args: DeleteArgs) -> anyhow::Result<()> {
    let kind = match args.kind {
        ResourceKind::Widget => {
            session.clients.widgets().delete(&session.ctx, &args.name)?;
            Widget::KIND
        }
        ResourceKind::ConfigSet => {
            session.clients.config_sets().delete(&session.ctx, &args.name)?;
            ConfigSet::KIND
        }
    };
    println!("{} {} {} deleted", "✓".green().bold(), kind, args.name.bold());
    Ok(())
}
