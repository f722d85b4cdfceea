use std::{collections::VecDeque, sync::Arc};

use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinHandle,
};

use crate::domain::{
    repositories::{
        image::ImageRepository, library::LibraryRepository, progress::ProgressRepository,
        source::SourceRepository,
    },
    services::library::{LibraryError, LibraryService},
};

pub type DownloadSender = UnboundedSender<Command>;
type DownloadReceiver = UnboundedReceiver<Command>;

#[derive(Debug)]
pub enum Command {
    InsertIntoQueue { manga_id: String, chapter_id: String },
    Download,
}

/// Drains a FIFO of (manga, chapter) pairs through the library's download
/// operation, one at a time. `Download` re-sends itself while the queue is
/// non-empty, so downloads stay strictly sequential.
pub struct DownloadWorker<L, P, S, I>
where
    L: LibraryRepository + 'static,
    P: ProgressRepository + 'static,
    S: SourceRepository + 'static,
    I: ImageRepository + 'static,
{
    svc: Arc<LibraryService<L, P, S, I>>,
    queue: VecDeque<(String, String)>,
    tx: DownloadSender,
    rx: DownloadReceiver,
}

impl<L, P, S, I> DownloadWorker<L, P, S, I>
where
    L: LibraryRepository + 'static,
    P: ProgressRepository + 'static,
    S: SourceRepository + 'static,
    I: ImageRepository + 'static,
{
    fn new(svc: Arc<LibraryService<L, P, S, I>>, tx: DownloadSender, rx: DownloadReceiver) -> Self {
        Self {
            svc,
            queue: VecDeque::new(),
            tx,
            rx,
        }
    }

    async fn download(&self, manga_id: &str, chapter_id: &str) -> Result<(), LibraryError> {
        let Some(manga) = self.svc.manga_by_id(manga_id).await? else {
            warn!("manga {manga_id} not in library, skipping download");
            return Ok(());
        };
        let Some(chapter) = manga.chapters.iter().find(|c| c.id == chapter_id) else {
            warn!("chapter {chapter_id} not found for manga {manga_id}, skipping download");
            return Ok(());
        };

        self.svc.download_chapter(&manga, chapter).await?;

        Ok(())
    }

    pub async fn run(mut self) {
        loop {
            let Some(cmd) = self.rx.recv().await else {
                break;
            };

            match cmd {
                Command::InsertIntoQueue {
                    manga_id,
                    chapter_id,
                } => {
                    debug!("queueing chapter {chapter_id} of manga {manga_id}");
                    self.queue.push_back((manga_id, chapter_id));
                    let _ = self.tx.send(Command::Download);
                }
                Command::Download => {
                    let Some((manga_id, chapter_id)) = self.queue.pop_front() else {
                        continue;
                    };

                    if let Err(e) = self.download(&manga_id, &chapter_id).await {
                        error!("failed to download chapter {chapter_id}: {e}");
                    }

                    if !self.queue.is_empty() {
                        let _ = self.tx.send(Command::Download);
                    }
                }
            }
        }
    }
}

pub fn channel() -> (DownloadSender, DownloadReceiver) {
    unbounded_channel::<Command>()
}

pub fn start<L, P, S, I>(
    svc: Arc<LibraryService<L, P, S, I>>,
    tx: DownloadSender,
    rx: DownloadReceiver,
) -> JoinHandle<()>
where
    L: LibraryRepository + 'static,
    P: ProgressRepository + 'static,
    S: SourceRepository + 'static,
    I: ImageRepository + 'static,
{
    tokio::spawn(DownloadWorker::new(svc, tx, rx).run())
}
