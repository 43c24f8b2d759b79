//! Line-driven terminal front end over a [`FileManagerSession`].

use std::io::{self, BufRead, Write};

use crate::format::{metadata_report, storage_line};
use crate::session::{FileManagerSession, PendingAction, SessionError};

const HELP: &str = "\
commands:
  ls                     show the current directory
  refresh                re-read the directory and storage stats
  cd <folder>            enter a folder (`cd ..` goes up)
  up                     go to the parent folder
  open <file>            open a file for editing
  show                   print the edit buffer
  edit <text>            replace the edit buffer
  append <text>          add a line to the edit buffer
  save                   write the buffer and close the file
  close                  close the file without saving
  mkdir <name>           create a folder
  touch <name> [text]    create <name>.txt with optional content
  rm <item>              delete a file or folder (asks for confirmation)
  mv <item> <new-name>   rename a file or folder
  info <item>            show item metadata
  df                     show storage usage
  help                   show this help
  quit                   leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether the read loop should keep going after a line.
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop reading.
    Quit,
}

/// Terminal screen rendering one session to `out`.
pub struct Screen<W: Write> {
    session: FileManagerSession,
    out: W,
}

impl<W: Write> Screen<W> {
    /// Wraps an opened session.
    pub fn new(session: FileManagerSession, out: W) -> Self {
        Self { session, out }
    }

    /// Session driven by this screen.
    pub fn session(&self) -> &FileManagerSession {
        &self.session
    }

    /// Output sink.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Renders the directory, then handles lines from `input` until `quit` or end of input.
    pub async fn run<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        self.render()?;
        self.prompt()?;
        for line in input.lines() {
            if self.handle_line(&line?).await? == Flow::Quit {
                break;
            }
            self.prompt()?;
        }
        Ok(())
    }

    /// Writes the current directory listing and storage footer.
    pub fn render(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", self.session.current_path().dir_string())?;
        if self.session.entries().is_empty() {
            writeln!(self.out, "  (empty)")?;
        }
        for label in self.session.entries().labels() {
            writeln!(self.out, "  {label}")?;
        }
        if let Some(file) = self.session.open_file() {
            writeln!(self.out, "editing: {}", file.dir.join(&file.name))?;
        }
        writeln!(self.out, "{}", storage_line(self.session.storage()))
    }

    /// Handles one input line.
    pub async fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        if let Some(PendingAction::Delete { label, .. }) = self.session.pending().cloned() {
            return self.answer_delete(&label, line.trim()).await;
        }

        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim_start()),
            None => (line, ""),
        };

        let outcome = match command {
            "" => return Ok(Flow::Continue),
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => {
                writeln!(self.out, "{HELP}")?;
                return Ok(Flow::Continue);
            }
            "ls" => Ok(()),
            "df" => {
                writeln!(self.out, "{}", storage_line(self.session.storage()))?;
                return Ok(Flow::Continue);
            }
            "refresh" => self.session.refresh().await.map(|_| ()),
            "cd" if rest == ".." => self.session.go_up().await,
            "cd" => self.session.open_folder(rest).await,
            "up" => self.session.go_up().await,
            "open" => match self.session.open_file_named(rest).await {
                Ok(()) => return self.show_buffer().map(|()| Flow::Continue),
                Err(err) => Err(err),
            },
            "show" => return self.show_buffer().map(|()| Flow::Continue),
            "edit" => self.session.set_buffer(rest),
            "append" => self.append_line(rest),
            "save" => self.session.save_file().await,
            "close" => {
                self.session.close_file();
                Ok(())
            }
            "mkdir" => {
                self.session.drafts_mut().folder_name = rest.to_string();
                self.session.create_folder().await
            }
            "touch" => {
                let (name, content) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let drafts = self.session.drafts_mut();
                drafts.file_name = name.to_string();
                drafts.file_content = content.trim_start().to_string();
                self.session.create_file().await
            }
            "rm" => match self.session.request_delete(rest) {
                Ok(()) => {
                    writeln!(self.out, "delete {rest}? [y/N]")?;
                    return Ok(Flow::Continue);
                }
                Err(err) => Err(err),
            },
            "mv" => self.rename(rest).await,
            "info" => {
                let metadata = self.session.item_info(rest).await;
                writeln!(self.out, "{}", metadata_report(&metadata))?;
                return Ok(Flow::Continue);
            }
            other => {
                writeln!(self.out, "unknown command `{other}`; try `help`")?;
                return Ok(Flow::Continue);
            }
        };

        self.report(outcome)?;
        Ok(Flow::Continue)
    }

    async fn answer_delete(&mut self, label: &str, answer: &str) -> io::Result<Flow> {
        if matches!(answer, "y" | "Y" | "yes") {
            let outcome = self.session.confirm_delete().await;
            self.report(outcome)?;
        } else {
            self.session.cancel_pending();
            writeln!(self.out, "kept {label}")?;
        }
        Ok(Flow::Continue)
    }

    async fn rename(&mut self, args: &str) -> Result<(), SessionError> {
        let (label, new_name) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
        self.session.begin_rename(label)?;
        self.session.set_rename_input(new_name.trim())?;
        let renamed = self.session.confirm_rename().await;
        self.session.cancel_pending();
        renamed.map(|_| ())
    }

    fn append_line(&mut self, text: &str) -> Result<(), SessionError> {
        let mut buffer = self
            .session
            .open_file()
            .map(|file| file.buffer.clone())
            .ok_or(SessionError::NoOpenFile)?;
        if !buffer.is_empty() && !buffer.ends_with('\n') {
            buffer.push('\n');
        }
        buffer.push_str(text);
        self.session.set_buffer(buffer)
    }

    fn show_buffer(&mut self) -> io::Result<()> {
        match self.session.open_file() {
            Some(file) => {
                writeln!(self.out, "--- {} ---", file.name)?;
                writeln!(self.out, "{}", file.buffer)?;
                writeln!(self.out, "---")
            }
            None => writeln!(self.out, "error: {}", SessionError::NoOpenFile),
        }
    }

    fn report(&mut self, outcome: Result<(), SessionError>) -> io::Result<()> {
        if let Err(err) = outcome {
            writeln!(self.out, "error: {err}")?;
        }
        self.render()
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use appdata_host::{AppDataPath, HostFs, MemoryHostFs};
    use futures::executor::block_on;

    use super::*;
    use crate::facade::AppDataFiles;

    fn screen_over(host: &MemoryHostFs) -> Screen<Vec<u8>> {
        let files = AppDataFiles::new(Rc::new(host.clone()));
        let session = block_on(FileManagerSession::open(files)).expect("open session");
        Screen::new(session, Vec::new())
    }

    fn run_script(screen: &mut Screen<Vec<u8>>, script: &str) -> String {
        block_on(screen.run(script.as_bytes())).expect("run script");
        String::from_utf8(screen.output().clone()).expect("utf-8 output")
    }

    fn path(raw: &str) -> AppDataPath {
        AppDataPath::parse(raw).expect("path")
    }

    #[test]
    fn builds_and_browses_a_small_tree() {
        let host = MemoryHostFs::default();
        let mut screen = screen_over(&host);
        let output = run_script(
            &mut screen,
            "mkdir docs\ncd docs/\ntouch todo buy milk\nls\nquit\nmkdir never\n",
        );

        assert!(output.contains("/docs/\n  todo.txt\n"));
        assert_eq!(
            block_on(host.read_text(&path("/docs/todo.txt"))).expect("file"),
            "buy milk"
        );
        assert!(!host.exists(&path("/docs/never")));
        assert!(!host.exists(&path("/never")));
    }

    #[test]
    fn delete_needs_a_yes() {
        let host = MemoryHostFs::default();
        block_on(host.make_dir(&path("/keep"), false)).expect("seed");
        block_on(host.make_dir(&path("/drop"), false)).expect("seed");
        let mut screen = screen_over(&host);

        let output = run_script(&mut screen, "rm keep/\nn\nrm drop/\ny\n");
        assert!(output.contains("delete keep/? [y/N]"));
        assert!(output.contains("kept keep/"));
        assert!(host.exists(&path("/keep")));
        assert!(!host.exists(&path("/drop")));
    }

    #[test]
    fn errors_are_printed_and_the_loop_continues() {
        let host = MemoryHostFs::default();
        let mut screen = screen_over(&host);
        let output = run_script(&mut screen, "cd ghost\nsave\nmkdir ok\n");

        assert!(output.contains("error: not found: `/ghost`"));
        assert!(output.contains("error: no file is open"));
        assert!(host.exists(&path("/ok")));
        assert!(screen.session().current_path().is_root());
    }

    #[test]
    fn edit_append_and_save_round_trip() {
        let host = MemoryHostFs::default();
        block_on(host.write_text(&path("/notes.txt"), "one")).expect("seed");
        let mut screen = screen_over(&host);

        let output = run_script(&mut screen, "open notes.txt\nappend two\nsave\n");
        assert!(output.contains("--- notes.txt ---\none\n---"));
        assert_eq!(
            block_on(host.read_text(&path("/notes.txt"))).expect("saved"),
            "one\ntwo"
        );
        assert!(screen.session().open_file().is_none());
    }

    #[test]
    fn save_after_changing_directory_writes_the_opened_file() {
        let host = MemoryHostFs::default();
        block_on(host.make_dir(&path("/docs"), false)).expect("seed");
        block_on(host.write_text(&path("/a.txt"), "root")).expect("seed");
        block_on(host.write_text(&path("/docs/a.txt"), "docs")).expect("seed");
        let mut screen = screen_over(&host);

        let output = run_script(&mut screen, "open a.txt\nedit changed\ncd docs/\nsave\n");
        assert!(output.contains("editing: /a.txt"));
        assert_eq!(
            block_on(host.read_text(&path("/a.txt"))).expect("root file"),
            "changed"
        );
        assert_eq!(
            block_on(host.read_text(&path("/docs/a.txt"))).expect("docs file"),
            "docs"
        );
    }

    #[test]
    fn rename_and_info_commands() {
        let host = MemoryHostFs::default();
        block_on(host.make_dir(&path("/old"), false)).expect("seed");
        let mut screen = screen_over(&host);

        let output = run_script(&mut screen, "mv old/ new\nmv new/ new\ninfo new/\n");
        assert!(host.exists(&path("/new")));
        assert!(output.contains("error: invalid input: choose a different name"));
        assert!(output.contains("\"is_directory\": true"));
        assert!(screen.session().pending().is_none());
    }
}
