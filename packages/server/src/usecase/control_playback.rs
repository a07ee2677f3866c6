//! UseCase: 再生操作
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - キューへの追加、再生/一時停止、スキップ、シーク、キューからの削除
//! - 再生状態の取得（壁時計との突き合わせ）
//!
//! ### なぜこのテストが必要か
//! - 全メンバーが同じ再生状態を観測することを保証
//! - 変更の種類に応じて state-changed / queue-updated が使い分けられることを確認
//! - 拒否された操作が状態を変えず、何も配信しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：空の Room にトラックを追加すると自動で再生が始まる
//! - 時間経過：トラックが終わった後の操作・取得で次のトラックに進む
//! - 異常系：再生中のトラックの削除、範囲外のインデックス

use std::sync::Arc;

use tunebox_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, PlaybackChange, PlaybackCommand, PlaybackSnapshot, RoomEvent,
    RoomId, RoomRepository, TrackIdFactory, TrackMetadata,
};

use super::{RoomUseCaseError, broadcast, now};

/// 再生操作のユースケース
pub struct ControlPlaybackUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ControlPlaybackUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// キューの末尾にトラックを追加する
    ///
    /// 空のキューに追加した場合はそのトラックの再生が始まる。
    pub async fn add_to_queue(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        metadata: TrackMetadata,
    ) -> Result<PlaybackSnapshot, RoomUseCaseError> {
        let identity = self.repository.identity(connection_id).await.ok_or_else(|| {
            RoomUseCaseError::InvalidState(format!("connection '{connection_id}' is not open"))
        })?;
        let track = metadata.into_track(TrackIdFactory::generate(), identity.username);
        self.apply(room_id, PlaybackCommand::AddToQueue(track)).await
    }

    pub async fn play_pause(&self, room_id: RoomId) -> Result<PlaybackSnapshot, RoomUseCaseError> {
        self.apply(room_id, PlaybackCommand::PlayPause).await
    }

    pub async fn next(&self, room_id: RoomId) -> Result<PlaybackSnapshot, RoomUseCaseError> {
        self.apply(room_id, PlaybackCommand::Next).await
    }

    pub async fn previous(&self, room_id: RoomId) -> Result<PlaybackSnapshot, RoomUseCaseError> {
        self.apply(room_id, PlaybackCommand::Previous).await
    }

    /// 再生位置を変更する（トラックの長さに丸められる）
    pub async fn seek(
        &self,
        room_id: RoomId,
        seconds: f64,
    ) -> Result<PlaybackSnapshot, RoomUseCaseError> {
        self.apply(room_id, PlaybackCommand::Seek(seconds)).await
    }

    pub async fn remove_from_queue(
        &self,
        room_id: RoomId,
        index: usize,
    ) -> Result<PlaybackSnapshot, RoomUseCaseError> {
        self.apply(room_id, PlaybackCommand::RemoveFromQueue(index))
            .await
    }

    /// 現在の再生状態を取得する
    ///
    /// 前回の操作以降にトラックが終わっていれば次に進め、state-changed を配信する。
    pub async fn snapshot(&self, room_id: RoomId) -> Result<PlaybackSnapshot, RoomUseCaseError> {
        let handle = self.repository.get_room(&room_id).await?;

        let (snapshot, auto_advanced, targets) = {
            let mut room = handle.lock().await;
            let (snapshot, auto_advanced) = room.playback_snapshot(now(self.clock.as_ref()));
            (snapshot, auto_advanced, room.member_ids())
        };

        if auto_advanced {
            tracing::debug!("Room '{}' advanced past a finished track", room_id);
            broadcast(
                self.message_pusher.as_ref(),
                targets,
                RoomEvent::StateChanged {
                    room_id,
                    snapshot: snapshot.clone(),
                },
            )
            .await;
        }
        Ok(snapshot)
    }

    async fn apply(
        &self,
        room_id: RoomId,
        command: PlaybackCommand,
    ) -> Result<PlaybackSnapshot, RoomUseCaseError> {
        let handle = self.repository.get_room(&room_id).await?;

        let (outcome, snapshot, targets) = {
            let mut room = handle.lock().await;
            let outcome = room.apply(command, now(self.clock.as_ref()));
            (outcome, room.current_snapshot(), room.member_ids())
        };

        // 操作が拒否されても、自動で進んだ分は配信する
        match outcome.notification() {
            Some(PlaybackChange::StateChanged) => {
                broadcast(
                    self.message_pusher.as_ref(),
                    targets,
                    RoomEvent::StateChanged {
                        room_id: room_id.clone(),
                        snapshot: snapshot.clone(),
                    },
                )
                .await;
            }
            Some(PlaybackChange::QueueUpdated) => {
                broadcast(
                    self.message_pusher.as_ref(),
                    targets,
                    RoomEvent::QueueUpdated {
                        room_id: room_id.clone(),
                        queue: snapshot.queue.clone(),
                        current_index: snapshot.current_index,
                    },
                )
                .await;
            }
            None => {}
        }

        if let Err(e) = outcome.result {
            tracing::warn!("Playback operation rejected in room '{}': {}", room_id, e);
            return Err(e.into());
        }
        Ok(snapshot)
    }
}
