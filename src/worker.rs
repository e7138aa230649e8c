
use crate::{
    DurableStorage,
    Error,
    FileSystem,
    MetadataRecord,
    MetadataStorage,
    PersistentStorage as _,
};
use futures::{
    channel::{
        mpsc,
        oneshot,
    },
    executor,
    future,
    StreamExt as _,
};
use log::debug;
use std::{
    fmt::Debug,
    thread,
};

enum Command {
    FetchRecord(oneshot::Sender<MetadataRecord>),
    Stop,
    Update {
        term: u64,
        voted_for: Option<u64>,
        completed: oneshot::Sender<Result<(), Error>>,
    },
}

impl Debug for Command {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Command::FetchRecord(_) => write!(f, "FetchRecord"),
            Command::Stop => write!(f, "Stop"),
            Command::Update {
                term,
                voted_for,
                ..
            } => write!(f, "Update({}, {:?})", term, voted_for),
        }
    }
}

type CommandReceiver = mpsc::UnboundedReceiver<Command>;
type CommandSender = mpsc::UnboundedSender<Command>;

async fn serve<F>(
    mut storage: DurableStorage<F>,
    command_receiver: CommandReceiver,
) where
    F: FileSystem,
{
    command_receiver
        .take_while(|command| future::ready(!matches!(command, Command::Stop)))
        .for_each(|command| {
            debug!("Received {:?}", command);
            match command {
                Command::FetchRecord(response_sender) => {
                    let _ = response_sender.send(storage.record());
                },
                Command::Update {
                    term,
                    voted_for,
                    completed,
                } => {
                    let _ = completed.send(storage.update(term, voted_for));
                },
                Command::Stop => unreachable!(),
            }
            future::ready(())
        })
        .await;
    debug!("Received Stop");
}

/// This runs all metadata operations for one directory on a thread of its
/// own, one at a time and in the order they were requested.
pub struct MetadataWorker {
    command_sender: CommandSender,
    thread_join_handle: Option<thread::JoinHandle<()>>,
}

impl MetadataWorker {
    /// Start the worker thread and recover the metadata on it.  The worker
    /// is only returned once recovery has completed successfully.
    pub async fn open<F>(storage: MetadataStorage<F>) -> Result<Self, Error>
    where
        F: FileSystem + 'static,
    {
        let (command_sender, command_receiver) = mpsc::unbounded();
        let (opened_sender, opened_receiver) = oneshot::channel();
        let thread_join_handle = thread::spawn(move || {
            let storage = match DurableStorage::open(storage) {
                Ok(storage) => {
                    let _ = opened_sender.send(Ok(()));
                    storage
                },
                Err(error) => {
                    let _ = opened_sender.send(Err(error));
                    return;
                },
            };
            executor::block_on(serve(storage, command_receiver))
        });
        let opened = opened_receiver
            .await
            .expect("metadata worker thread exited before finishing recovery");
        if let Err(error) = opened {
            let _ = thread_join_handle.join();
            return Err(error);
        }
        Ok(Self {
            command_sender,
            thread_join_handle: Some(thread_join_handle),
        })
    }

    /// Return the record most recently committed.
    pub async fn record(&self) -> MetadataRecord {
        let (sender, receiver) = oneshot::channel();
        self.command_sender
            .unbounded_send(Command::FetchRecord(sender))
            .expect("metadata worker command receiver dropped prematurely");
        receiver.await.expect("metadata worker dropped record sender")
    }

    /// Durably record a new term and vote.
    pub async fn update(
        &self,
        term: u64,
        voted_for: Option<u64>,
    ) -> Result<(), Error> {
        let (completed, receiver) = oneshot::channel();
        self.command_sender
            .unbounded_send(Command::Update {
                term,
                voted_for,
                completed,
            })
            .expect("metadata worker command receiver dropped prematurely");
        receiver.await.expect("metadata worker dropped update results sender")
    }
}

impl Drop for MetadataWorker {
    fn drop(&mut self) {
        let _ = self.command_sender.unbounded_send(Command::Stop);
        if let Some(thread_join_handle) = self.thread_join_handle.take() {
            thread_join_handle
                .join()
                .expect("the metadata worker thread panicked before we could join it");
        }
    }
}
