//! Line-oriented shell over [`FarmDashboardApi`].

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use farm_dashboard::client::FarmDashboardApi;
use farm_dashboard::model::{
    AssetKind, AssetUpload, DashboardView, DeleteOutcome, FarmDraft, FormMode, NotificationLevel,
    ProfileFields,
};
use uuid::Uuid;

pub const HELP: &str = "\
Commands:
  login <email> <password>             sign in
  signup <email> <password> <confirm>  create an account
  logout                               sign out
  profile                              show the profile (and draft while editing)
  edit <field> <value>                 start or continue editing a profile field
  save | cancel                        save or discard the profile draft
  upload <avatar|cover> <path>         upload a profile image
  farms                                reload and list farms
  add-farm                             open the new-farm form
  farm <name|area|location> <value>    fill the new-farm form
  submit-farm | cancel-farm            create the farm or discard the form
  delete-farm <id>                     delete a farm (asks first)
  delete-account                       end the account session (asks first)
  metrics [farm-id]                    dashboard or per-farm figures
  weather                              current weather snapshot
  help | quit";

/// Parsed shell input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { email: String, password: String },
    Signup { email: String, password: String, confirm: String },
    Logout,
    Profile,
    Edit { field: String, value: String },
    Save,
    Cancel,
    Upload { kind: AssetKind, path: String },
    Farms,
    AddFarm,
    Farm { field: String, value: String },
    SubmitFarm,
    CancelFarm,
    DeleteFarm(Uuid),
    DeleteAccount,
    Metrics(Option<Uuid>),
    Weather,
    Help,
    Quit,
    Empty,
}

fn rest_of(parts: &[&str], from: usize) -> String {
    parts.get(from..).map(|p| p.join(" ")).unwrap_or_default()
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("'{}' is not a farm id", raw))
}

pub fn parse(line: &str) -> Result<Command> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = parts.first() else {
        return Ok(Command::Empty);
    };

    let cmd = match (head, parts.len()) {
        ("login", 3) => Command::Login {
            email: parts[1].to_string(),
            password: parts[2].to_string(),
        },
        ("signup", 4) => Command::Signup {
            email: parts[1].to_string(),
            password: parts[2].to_string(),
            confirm: parts[3].to_string(),
        },
        ("logout", 1) => Command::Logout,
        ("profile", 1) => Command::Profile,
        ("edit", n) if n >= 2 => Command::Edit {
            field: parts[1].to_string(),
            value: rest_of(&parts, 2),
        },
        ("save", 1) => Command::Save,
        ("cancel", 1) => Command::Cancel,
        ("upload", n) if n >= 3 => {
            let kind = match parts[1] {
                "avatar" => AssetKind::Avatar,
                "cover" => AssetKind::Cover,
                other => bail!("unknown image kind '{}', expected avatar or cover", other),
            };
            Command::Upload {
                kind,
                path: rest_of(&parts, 2),
            }
        }
        ("farms", 1) => Command::Farms,
        ("add-farm", 1) => Command::AddFarm,
        ("farm", n) if n >= 2 => Command::Farm {
            field: parts[1].to_string(),
            value: rest_of(&parts, 2),
        },
        ("submit-farm", 1) => Command::SubmitFarm,
        ("cancel-farm", 1) => Command::CancelFarm,
        ("delete-farm", 2) => Command::DeleteFarm(parse_id(parts[1])?),
        ("delete-account", 1) => Command::DeleteAccount,
        ("metrics", 1) => Command::Metrics(None),
        ("metrics", 2) => Command::Metrics(Some(parse_id(parts[1])?)),
        ("weather", 1) => Command::Weather,
        ("help", _) | ("?", _) => Command::Help,
        ("quit", _) | ("exit", _) => Command::Quit,
        (other, _) => bail!("unrecognized input '{}', try 'help'", other),
    };
    Ok(cmd)
}

fn optional(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

fn flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => bail!("expected on/off, got '{}'", other),
    }
}

/// Apply one `edit` command to a profile draft. An empty value clears
/// optional fields.
pub fn set_profile_field(fields: &mut ProfileFields, field: &str, value: &str) -> Result<()> {
    match field {
        "full_name" | "name" => fields.full_name = value.trim().to_string(),
        "display_name" => fields.display_name = optional(value),
        "phone" => fields.phone = optional(value),
        "birth_date" => {
            fields.birth_date = match optional(value) {
                Some(v) => Some(
                    NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                        .with_context(|| format!("'{}' is not a YYYY-MM-DD date", v))?,
                ),
                None => None,
            }
        }
        "address" => fields.address = optional(value),
        "professional_title" | "title" => fields.professional_title = optional(value),
        "company" => fields.company = optional(value),
        "area_of_expertise" | "expertise" => fields.area_of_expertise = optional(value),
        "bio" => fields.bio = optional(value),
        "email_notifications" => fields.notification_preferences.email = flag(value)?,
        "push_notifications" => fields.notification_preferences.push = flag(value)?,
        other => bail!("unknown profile field '{}'", other),
    }
    Ok(())
}

/// Farm form input is stored as typed; the dashboard validates on submit.
pub fn set_farm_field(draft: &mut FarmDraft, field: &str, value: &str) -> Result<()> {
    match field {
        "name" => draft.name = value.to_string(),
        "area" => draft.area = value.to_string(),
        "location" => draft.location = value.to_string(),
        other => bail!("unknown farm field '{}'", other),
    }
    Ok(())
}

pub fn content_type_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime.to_string())
}

fn read_upload(path: &str) -> Result<AssetUpload> {
    let p = Path::new(path);
    let bytes = std::fs::read(p).with_context(|| format!("cannot read '{}'", path))?;
    let file_name = p
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();
    Ok(AssetUpload {
        file_name,
        content_type: content_type_for(p),
        bytes,
    })
}

fn show_opt(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("-")
}

fn render_profile(out: &mut impl Write, view: &DashboardView) -> std::io::Result<()> {
    let Some(p) = &view.profile else {
        return writeln!(out, "no profile loaded");
    };
    writeln!(out, "{} ({})", p.full_name, show_opt(&p.display_name))?;
    writeln!(out, "  title:     {}", show_opt(&p.professional_title))?;
    writeln!(out, "  company:   {}", show_opt(&p.company))?;
    writeln!(out, "  expertise: {}", show_opt(&p.area_of_expertise))?;
    writeln!(out, "  phone:     {}", show_opt(&p.phone))?;
    writeln!(out, "  address:   {}", show_opt(&p.address))?;
    match p.birth_date {
        Some(d) => writeln!(out, "  born:      {}", d)?,
        None => writeln!(out, "  born:      -")?,
    }
    writeln!(out, "  bio:       {}", show_opt(&p.bio))?;
    writeln!(out, "  avatar:    {}", show_opt(&p.avatar_url))?;
    writeln!(out, "  cover:     {}", show_opt(&p.cover_image))?;
    writeln!(
        out,
        "  notify:    email={} push={}",
        p.notification_preferences.email, p.notification_preferences.push
    )?;
    if let (FormMode::Editing, Some(d)) = (view.profile_mode, &view.profile_draft) {
        writeln!(
            out,
            "editing: full_name={} display_name={} company={} bio={}",
            d.full_name,
            show_opt(&d.display_name),
            show_opt(&d.company),
            show_opt(&d.bio)
        )?;
    }
    Ok(())
}

fn render_farms(out: &mut impl Write, view: &DashboardView) -> std::io::Result<()> {
    if view.farms.is_empty() {
        return writeln!(out, "no farms yet");
    }
    for f in &view.farms {
        writeln!(
            out,
            "{}  {:<24} {:>10.2} ha  {}",
            f.id, f.name, f.area, f.location
        )?;
    }
    Ok(())
}

/// Print notifications raised since the last command, then dismiss them.
fn drain_notifications(api: &dyn FarmDashboardApi, out: &mut impl Write) -> std::io::Result<()> {
    for n in api.view().notifications {
        let tag = match n.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
            NotificationLevel::Info => "info",
        };
        writeln!(out, "[{}] {}", tag, n.message)?;
        api.dismiss_notification(n.id);
    }
    Ok(())
}

pub struct Shell<W: Write> {
    api: Arc<dyn FarmDashboardApi>,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(api: Arc<dyn FarmDashboardApi>, out: W) -> Self {
        Self { api, out }
    }

    /// Run one input line. Returns `false` once the user asked to quit.
    /// Dashboard failures are printed, not returned; only output errors are.
    pub async fn handle_line(&mut self, line: &str) -> Result<bool> {
        let keep_going = match parse(line) {
            Ok(Command::Quit) => false,
            Ok(cmd) => {
                if let Err(e) = self.execute(cmd).await {
                    writeln!(self.out, "error: {:#}", e)?;
                }
                true
            }
            Err(e) => {
                writeln!(self.out, "error: {:#}", e)?;
                true
            }
        };
        drain_notifications(self.api.as_ref(), &mut self.out)?;
        self.out.flush()?;
        Ok(keep_going)
    }

    async fn execute(&mut self, cmd: Command) -> Result<()> {
        let api = self.api.clone();
        match cmd {
            Command::Empty | Command::Quit => {}
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Login { email, password } => {
                let session = api.sign_in(&email, &password).await?;
                writeln!(
                    self.out,
                    "signed in as {}",
                    session.user.email.as_deref().unwrap_or("(no email)")
                )?;
            }
            Command::Signup {
                email,
                password,
                confirm,
            } => match api.sign_up(&email, &password, &confirm).await? {
                Some(_) => writeln!(self.out, "account created, signed in")?,
                None => writeln!(self.out, "account created, confirm your email to sign in")?,
            },
            Command::Logout => {
                api.sign_out().await?;
                writeln!(self.out, "signed out")?;
            }
            Command::Profile => render_profile(&mut self.out, &api.view())?,
            Command::Edit { field, value } => {
                if api.view().profile_mode != FormMode::Editing && !api.begin_profile_edit() {
                    bail!("no profile loaded, sign in first");
                }
                // Validate before touching the draft so a typo leaves it intact.
                let mut probe = ProfileFields::default();
                set_profile_field(&mut probe, &field, &value)?;
                api.edit_profile(Box::new(move |f| {
                    let _ = set_profile_field(f, &field, &value);
                }));
            }
            Command::Save => {
                let saved = api.save_profile().await?;
                writeln!(self.out, "saved profile of {}", saved.full_name)?;
            }
            Command::Cancel => {
                if !api.cancel_profile_edit() {
                    writeln!(self.out, "nothing to cancel")?;
                }
            }
            Command::Upload { kind, path } => {
                let upload = read_upload(&path)?;
                let url = api.upload_asset(kind, upload).await?;
                writeln!(self.out, "{} available at {}", kind, url)?;
            }
            Command::Farms => {
                api.refresh_farms().await?;
                render_farms(&mut self.out, &api.view())?;
            }
            Command::AddFarm => {
                if !api.open_farm_form() {
                    writeln!(self.out, "farm form already open")?;
                }
            }
            Command::Farm { field, value } => {
                set_farm_field(&mut FarmDraft::default(), &field, &value)?;
                if !api.edit_farm_form(Box::new(move |d| {
                    let _ = set_farm_field(d, &field, &value);
                })) {
                    bail!("no farm form open, use 'add-farm' first");
                }
            }
            Command::SubmitFarm => {
                let farm = api.submit_farm().await?;
                writeln!(self.out, "created farm {} ({})", farm.name, farm.id)?;
            }
            Command::CancelFarm => {
                if !api.cancel_farm_form() {
                    writeln!(self.out, "no farm form open")?;
                }
            }
            Command::DeleteFarm(id) => match api.delete_farm(id).await? {
                DeleteOutcome::Deleted => writeln!(self.out, "farm deleted")?,
                DeleteOutcome::Cancelled => writeln!(self.out, "kept")?,
            },
            Command::DeleteAccount => match api.delete_account().await? {
                DeleteOutcome::Deleted => writeln!(self.out, "account session ended")?,
                DeleteOutcome::Cancelled => writeln!(self.out, "kept")?,
            },
            Command::Metrics(None) => {
                let m = api.metrics();
                writeln!(self.out, "total area:       {:.2} ha", m.total_area)?;
                writeln!(self.out, "avg productivity: {:.2} kg/ha", m.avg_productivity)?;
                writeln!(self.out, "revenue:          {:.0}", m.total_revenue)?;
                writeln!(self.out, "costs:            {:.0}", m.total_costs)?;
                writeln!(self.out, "weather alerts:   {}", m.weather_alerts)?;
                writeln!(self.out, "active projects:  {}", m.active_projects)?;
            }
            Command::Metrics(Some(id)) => match api.farm_productivity(id) {
                Some(p) => writeln!(self.out, "estimated productivity: {:.2} kg/ha", p)?,
                None => writeln!(self.out, "no such farm")?,
            },
            Command::Weather => {
                let w = api.weather();
                writeln!(
                    self.out,
                    "{:.0} °C, humidity {:.0}%, wind {:.0} km/h, rain {:.0}%",
                    w.temperature, w.humidity, w.wind_speed, w.rain_chance
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_free_text_values() {
        assert_eq!(
            parse("edit bio Cacao under shade trees").unwrap(),
            Command::Edit {
                field: "bio".into(),
                value: "Cacao under shade trees".into()
            }
        );
        assert_eq!(
            parse("farm location Ilhéus, BA").unwrap(),
            Command::Farm {
                field: "location".into(),
                value: "Ilhéus, BA".into()
            }
        );
        assert_eq!(parse("cancel").unwrap(), Command::Cancel);
        assert_eq!(parse("cancel-farm").unwrap(), Command::CancelFarm);
        assert_eq!(parse("   ").unwrap(), Command::Empty);
        assert_eq!(parse("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn rejects_bad_arity_and_ids() {
        assert!(parse("login only-email").is_err());
        assert!(parse("delete-farm not-a-uuid").is_err());
        assert!(parse("upload banner x.png").is_err());
        assert!(parse("dance").is_err());
    }

    #[test]
    fn profile_fields_are_set_and_cleared() {
        let mut f = ProfileFields::default();
        set_profile_field(&mut f, "company", "Cacau Vivo").unwrap();
        set_profile_field(&mut f, "birth_date", "1988-03-14").unwrap();
        set_profile_field(&mut f, "push_notifications", "off").unwrap();
        assert_eq!(f.company.as_deref(), Some("Cacau Vivo"));
        assert_eq!(f.birth_date, NaiveDate::from_ymd_opt(1988, 3, 14));
        assert!(!f.notification_preferences.push);

        set_profile_field(&mut f, "company", "").unwrap();
        assert_eq!(f.company, None);
        assert!(set_profile_field(&mut f, "birth_date", "14/03/1988").is_err());
        assert!(set_profile_field(&mut f, "shoe_size", "42").is_err());
    }

    #[test]
    fn farm_fields_keep_raw_input() {
        let mut d = FarmDraft::default();
        set_farm_field(&mut d, "area", "doze").unwrap();
        assert_eq!(d.area, "doze");
        assert!(set_farm_field(&mut d, "owner", "x").is_err());
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(
            content_type_for(Path::new("me.JPG")).as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(content_type_for(Path::new("notes")), None);
        assert_eq!(content_type_for(Path::new("a.tar.gz")), None);
    }
}
