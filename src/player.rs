use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::PlayerError;
use crate::events::{ChannelId, EventSink, GuildId, PlayerEvent};
use crate::loops::LoopMode;
use crate::providers::{SearchResult, Track};
use crate::queue::PlaybackQueue;
use crate::transport::{format_duration, NotificationSink, NowPlaying, VoiceTransport};

/// Tope blando de volumen; por encima se requiere el flag forzado
pub const SOFT_VOLUME_CAP: u16 = 100;

/// Techo duro de volumen, incluso forzado (el límite del backend)
pub const HARD_VOLUME_CEILING: u16 = 1000;

/// Estado escalar de la sesión, bajo un solo lock corto.
///
/// Disciplina de escritor único: solo las operaciones de la propia
/// sesión mutan esto, nunca se mantiene el lock a través de un await.
struct SessionState {
    current: Option<Track>,
    loop_mode: LoopMode,
    volume: u16,
    paused: bool,
}

/// Sesión de reproducción por guild.
///
/// Agrega la cola, el modo de loop, el track actual, el volumen y el
/// canal vinculado. Se crea al conectar al canal de voz y se destruye
/// explícitamente (comando stop) o tras el timeout de inactividad con la
/// cola vacía. La destrucción es terminal: el objeto no se reutiliza.
pub struct PlayerSession {
    guild_id: GuildId,
    bound_channel: ChannelId,
    queue: PlaybackQueue,
    state: Mutex<SessionState>,
    default_provider: String,
    idle_timeout: Duration,
    transport: Arc<dyn VoiceTransport>,
    notifier: Arc<dyn NotificationSink>,
    events: Arc<dyn EventSink>,
    destroyed: AtomicBool,
    advancing: AtomicBool,
}

impl PlayerSession {
    pub fn new(
        guild_id: GuildId,
        bound_channel: ChannelId,
        transport: Arc<dyn VoiceTransport>,
        notifier: Arc<dyn NotificationSink>,
        events: Arc<dyn EventSink>,
        config: &Config,
    ) -> Self {
        Self {
            guild_id,
            bound_channel,
            queue: PlaybackQueue::new(),
            state: Mutex::new(SessionState {
                current: None,
                loop_mode: LoopMode::Off,
                volume: config.default_volume,
                paused: false,
            }),
            default_provider: config.default_provider.clone(),
            idle_timeout: config.idle_timeout,
            transport,
            notifier,
            events,
            destroyed: AtomicBool::new(false),
            advancing: AtomicBool::new(false),
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn bound_channel(&self) -> ChannelId {
        self.bound_channel
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.state.lock().loop_mode
    }

    pub fn volume(&self) -> u16 {
        self.state.lock().volume
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Los comandos deben venir del canal de voz de la sesión
    pub fn ensure_same_channel(&self, channel: ChannelId) -> Result<(), PlayerError> {
        if channel != self.bound_channel {
            return Err(PlayerError::ChannelMismatch);
        }
        Ok(())
    }

    fn ensure_alive(&self) -> Result<(), PlayerError> {
        if self.is_destroyed() {
            return Err(PlayerError::Destroyed);
        }
        Ok(())
    }

    /// Encola el resultado de una búsqueda; devuelve cuántos tracks entraron
    pub fn enqueue(&self, result: SearchResult) -> usize {
        match result {
            SearchResult::Tracks(tracks) => self.queue.push_all(tracks),
            SearchResult::Playlist { name, tracks } => {
                let count = self.queue.push_all(tracks);
                info!("📃 Playlist `{}` encolada ({} tracks)", name, count);
                count
            }
        }
    }

    /// Avanza al siguiente track.
    ///
    /// Reentrante e idempotente: si ya hay algo sonando, o si otro avance
    /// está en vuelo entre el pop y el play, la llamada sale sin tocar el
    /// backend. Si no llega ningún track dentro de la ventana de
    /// inactividad, la sesión abandonada se desmonta sola.
    pub async fn advance_to_next(&self) -> Result<(), PlayerError> {
        if self.is_destroyed() {
            return Ok(());
        }

        if self.transport.is_playing() {
            return Ok(());
        }

        if self
            .advancing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Avance ya en vuelo para guild {}", self.guild_id);
            return Ok(());
        }

        let result = self.advance_inner().await;
        self.advancing.store(false, Ordering::Release);
        result
    }

    async fn advance_inner(&self) -> Result<(), PlayerError> {
        let (loop_mode, current) = {
            let state = self.state.lock();
            (state.loop_mode, state.current.clone())
        };

        let next = match (loop_mode, current) {
            // Loop de track: se reutiliza el actual sin tocar la cola
            (LoopMode::CurrentTrack, Some(track)) => track,
            (mode, current) => {
                // Loop de playlist: el track terminado vuelve al final
                if mode == LoopMode::Playlist {
                    if let Some(finished) = current {
                        self.queue.push(finished);
                    }
                }

                match self.queue.pop_wait(self.idle_timeout).await {
                    Ok(track) => track,
                    Err(PlayerError::QueueTimeout) => {
                        // Desmontaje esperado de una sesión abandonada,
                        // no un camino de error
                        if !self.transport.is_playing() {
                            info!("💤 Sesión ociosa en guild {}, desmontando", self.guild_id);
                            self.destroy().await?;
                        }
                        return Ok(());
                    }
                    Err(err) => return Err(err),
                }
            }
        };

        {
            let mut state = self.state.lock();
            state.current = Some(next.clone());
            state.paused = false;
        }

        self.transport.play(&next).await?;
        info!("▶️ Reproduciendo `{}` en guild {}", next.title(), self.guild_id);

        self.events.emit(PlayerEvent::TrackStart {
            guild_id: self.guild_id,
            track: next,
        });

        match self.now_playing() {
            Ok(now_playing) => {
                if let Err(err) = self.notifier.send(now_playing).await {
                    warn!("No se pudo renderizar la notificación: {}", err);
                }
            }
            Err(err) => warn!("Sin datos de ahora-suena tras el play: {}", err),
        }

        Ok(())
    }

    /// Desmonta la sesión: cola vacía, stop y disconnect del backend.
    /// La segunda llamada no vuelve a tocar el backend.
    pub async fn destroy(&self) -> Result<(), PlayerError> {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.queue.clear();
        self.state.lock().current = None;

        self.transport.stop().await?;
        self.transport.disconnect().await?;

        self.events.emit(PlayerEvent::PlayerStop {
            guild_id: self.guild_id,
        });
        info!("🛑 Sesión destruida para guild {}", self.guild_id);
        Ok(())
    }

    /// Salta el track actual. Un track en loop de sí mismo repetiría para
    /// siempre, así que el skip fuerza ese modo a off antes del stop; el
    /// backend señala la terminación y eso dispara el avance.
    pub async fn skip(&self) -> Result<(), PlayerError> {
        self.ensure_alive()?;

        {
            let mut state = self.state.lock();
            if state.loop_mode == LoopMode::CurrentTrack {
                state.loop_mode = LoopMode::Off;
            }
        }

        self.transport.stop().await?;
        self.events.emit(PlayerEvent::TrackSkip {
            guild_id: self.guild_id,
        });
        Ok(())
    }

    /// Pausa; devuelve `false` si ya estaba en pausa
    pub async fn pause(&self) -> Result<bool, PlayerError> {
        self.ensure_alive()?;

        if !self.transport.is_playing() {
            return Err(PlayerError::NothingPlaying);
        }

        {
            let state = self.state.lock();
            if state.paused {
                return Ok(false);
            }
        }

        self.transport.set_pause(true).await?;
        self.state.lock().paused = true;
        self.events.emit(PlayerEvent::PlayerPause {
            guild_id: self.guild_id,
        });
        Ok(true)
    }

    /// Reanuda; devuelve `false` si no estaba en pausa
    pub async fn resume(&self) -> Result<bool, PlayerError> {
        self.ensure_alive()?;

        if !self.transport.is_playing() {
            return Err(PlayerError::NothingPlaying);
        }

        {
            let state = self.state.lock();
            if !state.paused {
                return Ok(false);
            }
        }

        self.transport.set_pause(false).await?;
        self.state.lock().paused = false;
        self.events.emit(PlayerEvent::PlayerResume {
            guild_id: self.guild_id,
        });
        Ok(true)
    }

    /// Ajusta el volumen. El tope blando de 100 se supera solo con
    /// `forced`; el techo duro del backend no se supera nunca.
    pub async fn set_volume(&self, volume: u16, forced: bool) -> Result<u16, PlayerError> {
        self.ensure_alive()?;

        if volume > SOFT_VOLUME_CAP && !forced {
            return Err(PlayerError::VolumeOutOfRange(volume));
        }

        if volume > HARD_VOLUME_CEILING {
            return Err(PlayerError::VolumeOutOfRange(volume));
        }

        self.transport.set_volume(volume).await?;
        self.state.lock().volume = volume;
        info!("🔊 Volumen de guild {} ajustado a {}", self.guild_id, volume);
        Ok(volume)
    }

    /// Adelanta o atrasa `delta_secs` desde la posición actual.
    /// Devuelve la posición resultante en segundos.
    pub async fn seek(&self, delta_secs: i64) -> Result<u64, PlayerError> {
        self.ensure_alive()?;

        if !self.transport.is_playing() {
            return Err(PlayerError::NothingPlaying);
        }

        let old_pos = self.transport.position();
        let target = old_pos as i64 + delta_secs;

        if target > self.transport.track_length() as i64 {
            return Err(PlayerError::SeekOutOfRange);
        }

        let new_pos = target.max(0) as u64;
        self.transport.seek(new_pos * 1000).await?;

        self.events.emit(PlayerEvent::PlayerSeek {
            guild_id: self.guild_id,
            old_pos,
            new_pos,
        });
        Ok(new_pos)
    }

    /// Cambia el modo de loop. Sin token pedido se cicla
    /// Off → CurrentTrack → Playlist → Off; con token explícito se
    /// validan las precondiciones y se aplica tal cual.
    pub async fn set_loop(&self, token: Option<&str>) -> Result<LoopMode, PlayerError> {
        self.ensure_alive()?;

        if !self.transport.is_playing() {
            return Err(PlayerError::NothingPlaying);
        }

        let queue_len = self.queue.len();
        let mut state = self.state.lock();

        let new_mode = match token {
            None => state.loop_mode.cycle(queue_len),
            Some(token) => {
                let mode = LoopMode::parse(token)?;
                if mode == LoopMode::Playlist && queue_len == 0 {
                    return Err(PlayerError::NotEnoughTracks);
                }
                mode
            }
        };

        state.loop_mode = new_mode;
        Ok(new_mode)
    }

    /// Datos de "ahora suena" para el sink de notificaciones
    pub fn now_playing(&self) -> Result<NowPlaying, PlayerError> {
        let state = self.state.lock();
        let track = state.current.clone().ok_or(PlayerError::NothingPlaying)?;

        let next_up = if state.loop_mode == LoopMode::CurrentTrack {
            Some(track.title().to_string())
        } else {
            self.queue.peek_front().map(|t| t.title().to_string())
        };

        Ok(NowPlaying {
            title: track.title().to_string(),
            uri: track.uri().to_string(),
            author: track.author().to_string(),
            thumbnail: track.thumbnail_or_default().to_string(),
            duration: format_duration(track.length()),
            loop_mode: state.loop_mode,
            volume: state.volume,
            next_up,
        })
    }
}

/// Registro de sesiones por guild.
///
/// El dueño de cada sesión es el guild: una sesión por guild, creada al
/// conectar y retirada al destruir.
pub struct SessionRegistry {
    sessions: DashMap<GuildId, Arc<PlayerSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Registra la sesión recién conectada y anuncia la conexión
    pub fn connect(&self, session: Arc<PlayerSession>) -> Arc<PlayerSession> {
        session.events.emit(PlayerEvent::PlayerConnect {
            guild_id: session.guild_id,
        });
        self.sessions.insert(session.guild_id, session.clone());
        session
    }

    pub fn get(&self, guild_id: GuildId) -> Option<Arc<PlayerSession>> {
        self.sessions.get(&guild_id).map(|s| Arc::clone(&s))
    }

    /// Destruye y retira la sesión del guild, si existe
    pub async fn disconnect(&self, guild_id: GuildId) -> Result<(), PlayerError> {
        if let Some((_, session)) = self.sessions.remove(&guild_id) {
            session.destroy().await?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU64, AtomicUsize};
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    use crate::events::ChannelSink;

    /// Transporte falso que cuenta llamadas al backend
    struct FakeTransport {
        playing: AtomicBool,
        paused: AtomicBool,
        play_calls: AtomicUsize,
        stop_calls: AtomicUsize,
        disconnect_calls: AtomicUsize,
        volume_calls: Mutex<Vec<u16>>,
        seek_calls: Mutex<Vec<u64>>,
        played_titles: Mutex<Vec<String>>,
        position: AtomicU64,
        length: AtomicU64,
    }

    impl FakeTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                playing: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                play_calls: AtomicUsize::new(0),
                stop_calls: AtomicUsize::new(0),
                disconnect_calls: AtomicUsize::new(0),
                volume_calls: Mutex::new(Vec::new()),
                seek_calls: Mutex::new(Vec::new()),
                played_titles: Mutex::new(Vec::new()),
                position: AtomicU64::new(0),
                length: AtomicU64::new(0),
            })
        }

        /// Simula que el backend señaló el fin del track actual
        fn finish_track(&self) {
            self.playing.store(false, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl VoiceTransport for FakeTransport {
        async fn play(&self, track: &Track) -> Result<(), PlayerError> {
            self.play_calls.fetch_add(1, Ordering::SeqCst);
            self.played_titles.lock().push(track.title().to_string());
            self.length.store(track.length(), Ordering::SeqCst);
            self.playing.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) -> Result<(), PlayerError> {
            self.stop_calls.fetch_add(1, Ordering::SeqCst);
            self.playing.store(false, Ordering::SeqCst);
            Ok(())
        }

        async fn set_pause(&self, pause: bool) -> Result<(), PlayerError> {
            self.paused.store(pause, Ordering::SeqCst);
            Ok(())
        }

        async fn seek(&self, position_ms: u64) -> Result<(), PlayerError> {
            self.seek_calls.lock().push(position_ms);
            self.position.store(position_ms / 1000, Ordering::SeqCst);
            Ok(())
        }

        async fn set_volume(&self, volume: u16) -> Result<(), PlayerError> {
            self.volume_calls.lock().push(volume);
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), PlayerError> {
            self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn is_playing(&self) -> bool {
            self.playing.load(Ordering::SeqCst)
        }

        fn is_paused(&self) -> bool {
            self.paused.load(Ordering::SeqCst)
        }

        fn position(&self) -> u64 {
            self.position.load(Ordering::SeqCst)
        }

        fn track_length(&self) -> u64 {
            self.length.load(Ordering::SeqCst)
        }
    }

    struct FakeNotifier {
        sent: Mutex<Vec<NowPlaying>>,
    }

    impl FakeNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl NotificationSink for FakeNotifier {
        async fn send(&self, now_playing: NowPlaying) -> Result<(), PlayerError> {
            self.sent.lock().push(now_playing);
            Ok(())
        }
    }

    fn track(title: &str, length: u64) -> Track {
        Track::new(
            title.to_string(),
            "autor".to_string(),
            format!("https://example.com/{title}"),
            length,
        )
    }

    struct Harness {
        session: Arc<PlayerSession>,
        transport: Arc<FakeTransport>,
        notifier: Arc<FakeNotifier>,
        events: UnboundedReceiver<PlayerEvent>,
    }

    fn harness() -> Harness {
        let transport = FakeTransport::new();
        let notifier = FakeNotifier::new();
        let (tx, rx) = unbounded_channel();
        let session = Arc::new(PlayerSession::new(
            GuildId(42),
            ChannelId(7),
            transport.clone(),
            notifier.clone(),
            Arc::new(ChannelSink::new(tx)),
            &Config::default(),
        ));
        Harness {
            session,
            transport,
            notifier,
            events: rx,
        }
    }

    fn drain_event_names(rx: &mut UnboundedReceiver<PlayerEvent>) -> Vec<&'static str> {
        let mut names = Vec::new();
        while let Ok(event) = rx.try_recv() {
            names.push(event.name());
        }
        names
    }

    #[tokio::test]
    async fn test_advance_plays_next_and_notifies() {
        let mut h = harness();
        h.session.enqueue(SearchResult::Tracks(vec![track("primero", 225)]));

        h.session.advance_to_next().await.unwrap();

        assert_eq!(h.transport.play_calls.load(Ordering::SeqCst), 1);
        assert_eq!(drain_event_names(&mut h.events), vec!["track_start"]);

        let sent = h.notifier.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "primero");
        assert_eq!(sent[0].duration, "3:45");
        assert_eq!(sent[0].next_up, None);
    }

    #[tokio::test]
    async fn test_concurrent_advance_issues_single_play() {
        let h = harness();
        h.session.enqueue(SearchResult::Tracks(vec![track("único", 60)]));

        let (r1, r2) =
            futures::future::join(h.session.advance_to_next(), h.session.advance_to_next()).await;
        r1.unwrap();
        r2.unwrap();

        assert_eq!(h.transport.play_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_advance_is_noop_while_playing() {
        let h = harness();
        h.session.enqueue(SearchResult::Tracks(vec![track("a", 60), track("b", 60)]));

        h.session.advance_to_next().await.unwrap();
        // Sigue sonando `a`: el segundo avance no debe robar `b`
        h.session.advance_to_next().await.unwrap();

        assert_eq!(h.transport.play_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.session.queue_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_tears_down_session() {
        let mut h = harness();

        // Cola vacía: la espera expira y la sesión se desmonta sola
        h.session.advance_to_next().await.unwrap();

        assert!(h.session.is_destroyed());
        assert_eq!(h.transport.stop_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.transport.disconnect_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.transport.play_calls.load(Ordering::SeqCst), 0);
        assert_eq!(drain_event_names(&mut h.events), vec!["player_stop"]);
    }

    #[tokio::test]
    async fn test_destroy_twice_hits_backend_once() {
        let h = harness();

        h.session.destroy().await.unwrap();
        h.session.destroy().await.unwrap();

        assert_eq!(h.transport.stop_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.transport.disconnect_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_skip_forces_current_track_loop_off() {
        let mut h = harness();
        h.session.enqueue(SearchResult::Tracks(vec![track("a", 60), track("b", 60)]));
        h.session.advance_to_next().await.unwrap();
        h.session.set_loop(Some("track")).await.unwrap();

        h.session.skip().await.unwrap();

        assert_eq!(h.session.loop_mode(), LoopMode::Off);
        assert_eq!(h.transport.stop_calls.load(Ordering::SeqCst), 1);
        let names = drain_event_names(&mut h.events);
        assert_eq!(names, vec!["track_start", "track_skip"]);
    }

    #[tokio::test]
    async fn test_current_track_loop_replays_without_consuming_queue() {
        let h = harness();
        h.session.enqueue(SearchResult::Tracks(vec![track("a", 60), track("b", 60)]));
        h.session.advance_to_next().await.unwrap();
        h.session.set_loop(Some("track")).await.unwrap();

        h.transport.finish_track();
        h.session.advance_to_next().await.unwrap();

        let titles = h.transport.played_titles.lock().clone();
        assert_eq!(titles, vec!["a", "a"]);
        assert_eq!(h.session.queue_len(), 1);
    }

    #[tokio::test]
    async fn test_playlist_loop_requeues_finished_track() {
        let h = harness();
        h.session.enqueue(SearchResult::Tracks(vec![track("a", 60), track("b", 60)]));
        h.session.advance_to_next().await.unwrap();
        h.session.set_loop(Some("queue")).await.unwrap();

        h.transport.finish_track();
        h.session.advance_to_next().await.unwrap();

        let titles = h.transport.played_titles.lock().clone();
        assert_eq!(titles, vec!["a", "b"]);
        // `a` volvió al final de la cola
        assert_eq!(h.session.queue.peek_front().unwrap().title(), "a");
    }

    #[tokio::test]
    async fn test_volume_soft_cap_and_forced_override() {
        let h = harness();

        let err = h.session.set_volume(150, false).await.unwrap_err();
        assert!(matches!(err, PlayerError::VolumeOutOfRange(150)));
        assert!(h.transport.volume_calls.lock().is_empty());

        let set = h.session.set_volume(150, true).await.unwrap();
        assert_eq!(set, 150);
        assert_eq!(h.transport.volume_calls.lock().clone(), vec![150]);

        // El techo duro no se supera ni forzado
        let err = h.session.set_volume(HARD_VOLUME_CEILING + 1, true).await.unwrap_err();
        assert!(matches!(err, PlayerError::VolumeOutOfRange(_)));
        assert_eq!(h.transport.volume_calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_set_loop_preconditions() {
        let h = harness();

        // Nada sonando todavía
        let err = h.session.set_loop(None).await.unwrap_err();
        assert!(matches!(err, PlayerError::NothingPlaying));

        h.session.enqueue(SearchResult::Tracks(vec![track("a", 60)]));
        h.session.advance_to_next().await.unwrap();

        // Playlist explícito con cola vacía
        let err = h.session.set_loop(Some("queue")).await.unwrap_err();
        assert!(matches!(err, PlayerError::NotEnoughTracks));

        let err = h.session.set_loop(Some("bogus")).await.unwrap_err();
        assert!(matches!(err, PlayerError::InvalidLoopMode));

        assert_eq!(h.session.set_loop(Some("track")).await.unwrap(), LoopMode::CurrentTrack);
    }

    #[tokio::test]
    async fn test_auto_cycle_with_empty_queue_skips_playlist() {
        let h = harness();
        h.session.enqueue(SearchResult::Tracks(vec![track("a", 60)]));
        h.session.advance_to_next().await.unwrap();

        assert_eq!(h.session.set_loop(None).await.unwrap(), LoopMode::CurrentTrack);
        // Cola vacía: el ciclo salta Playlist y aterriza en Off
        assert_eq!(h.session.set_loop(None).await.unwrap(), LoopMode::Off);
    }

    #[tokio::test]
    async fn test_pause_resume_lifecycle() {
        let mut h = harness();

        assert!(matches!(
            h.session.pause().await.unwrap_err(),
            PlayerError::NothingPlaying
        ));

        h.session.enqueue(SearchResult::Tracks(vec![track("a", 60)]));
        h.session.advance_to_next().await.unwrap();

        assert!(h.session.pause().await.unwrap());
        // Idempotente: ya estaba en pausa
        assert!(!h.session.pause().await.unwrap());

        assert!(h.session.resume().await.unwrap());
        assert!(!h.session.resume().await.unwrap());

        let names = drain_event_names(&mut h.events);
        assert_eq!(names, vec!["track_start", "player_pause", "player_resume"]);
    }

    #[tokio::test]
    async fn test_seek_bounds() {
        let mut h = harness();
        h.session.enqueue(SearchResult::Tracks(vec![track("a", 100)]));
        h.session.advance_to_next().await.unwrap();
        h.transport.position.store(50, Ordering::SeqCst);

        // Más allá del final del track
        assert!(matches!(
            h.session.seek(60).await.unwrap_err(),
            PlayerError::SeekOutOfRange
        ));

        // Hacia atrás más allá del inicio se fija en 0
        assert_eq!(h.session.seek(-80).await.unwrap(), 0);
        assert_eq!(h.transport.seek_calls.lock().clone(), vec![0]);

        let names = drain_event_names(&mut h.events);
        assert_eq!(names, vec!["track_start", "player_seek"]);
    }

    #[tokio::test]
    async fn test_destroyed_session_rejects_commands() {
        let h = harness();
        h.session.destroy().await.unwrap();

        assert!(matches!(h.session.skip().await.unwrap_err(), PlayerError::Destroyed));
        assert!(matches!(
            h.session.set_volume(50, false).await.unwrap_err(),
            PlayerError::Destroyed
        ));
        // El avance sobre una sesión destruida es un no-op silencioso
        h.session.advance_to_next().await.unwrap();
        assert_eq!(h.transport.play_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_channel_mismatch() {
        let h = harness();
        assert!(h.session.ensure_same_channel(ChannelId(7)).is_ok());
        assert!(matches!(
            h.session.ensure_same_channel(ChannelId(8)).unwrap_err(),
            PlayerError::ChannelMismatch
        ));
    }

    #[tokio::test]
    async fn test_now_playing_next_up_follows_loop_mode() {
        let h = harness();
        h.session.enqueue(SearchResult::Tracks(vec![track("a", 60), track("b", 60)]));
        h.session.advance_to_next().await.unwrap();

        let np = h.session.now_playing().unwrap();
        assert_eq!(np.next_up.as_deref(), Some("b"));

        h.session.set_loop(Some("track")).await.unwrap();
        let np = h.session.now_playing().unwrap();
        // En loop de track lo siguiente es el mismo track
        assert_eq!(np.next_up.as_deref(), Some("a"));
        assert_eq!(np.thumbnail, crate::providers::DEFAULT_THUMBNAIL);
    }

    #[tokio::test]
    async fn test_registry_connect_and_disconnect() {
        let transport = FakeTransport::new();
        let (tx, mut rx) = unbounded_channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelSink::new(tx));
        let session = Arc::new(PlayerSession::new(
            GuildId(1),
            ChannelId(2),
            transport.clone(),
            FakeNotifier::new(),
            sink,
            &Config::default(),
        ));

        let registry = SessionRegistry::new();
        registry.connect(session.clone());
        assert_eq!(registry.len(), 1);
        assert!(registry.get(GuildId(1)).is_some());

        registry.disconnect(GuildId(1)).await.unwrap();
        assert!(registry.is_empty());
        assert!(session.is_destroyed());
        // Desconectar un guild sin sesión es un no-op
        registry.disconnect(GuildId(99)).await.unwrap();

        assert_eq!(drain_event_names(&mut rx), vec!["player_connect", "player_stop"]);
    }
}
