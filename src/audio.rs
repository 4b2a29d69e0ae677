use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy_kira_audio::{Audio, AudioChannel as KiraChannel, AudioPlugin, AudioSource};
use enum_map::{enum_map, Enum, EnumMap};

/// Sounds found under `assets/sfx/`, a missing file only logs an asset error.
#[derive(Enum, Clone, Copy, Debug)]
pub enum Sfx {
    /// Sticks knocking against the cylinder
    Rattle,
    /// The winning stick popping out
    Pop,
    /// The fortune is revealed
    Chime,
    /// Any UI button
    Click,
}
impl Sfx {
    fn path(self) -> &'static str {
        match self {
            Sfx::Rattle => "sfx/rattle.ogg",
            Sfx::Pop => "sfx/pop.ogg",
            Sfx::Chime => "sfx/chime.ogg",
            Sfx::Click => "sfx/click.ogg",
        }
    }
}

struct AudioChannels {
    /// One-shot effects
    sfx: KiraChannel,
    /// The rattle loop, stopped independently of one-shots
    rattle: KiraChannel,
}
impl Default for AudioChannels {
    fn default() -> Self {
        Self {
            sfx: KiraChannel::new("sfx".to_owned()),
            rattle: KiraChannel::new("rattle".to_owned()),
        }
    }
}

struct AudioAssets {
    sounds: EnumMap<Sfx, Handle<AudioSource>>,
}
impl FromWorld for AudioAssets {
    fn from_world(world: &mut World) -> Self {
        let assets = world.get_resource::<AssetServer>().unwrap();
        Self { sounds: enum_map! { sfx => assets.load(Sfx::path(sfx)) } }
    }
}

pub enum SfxParam {
    StartLoop,
    PlayOnce,
}
pub enum AudioRequest {
    StopSfxLoop,
    PlayRattle(SfxParam),
    PlayPop,
    PlayChime,
    PlayClick,
}
fn play_audio(
    assets: Res<AudioAssets>,
    audio: Res<Audio>,
    channels: Res<AudioChannels>,
    mut events: EventReader<AudioRequest>,
) {
    let sound = |sfx: Sfx| assets.sounds[sfx].clone();
    for event in events.iter() {
        match event {
            AudioRequest::StopSfxLoop => {
                audio.stop_channel(&channels.rattle);
            }
            AudioRequest::PlayRattle(SfxParam::StartLoop) => {
                audio.play_looped_in_channel(sound(Sfx::Rattle), &channels.rattle);
            }
            AudioRequest::PlayRattle(SfxParam::PlayOnce) => {
                audio.play_in_channel(sound(Sfx::Rattle), &channels.sfx);
            }
            AudioRequest::PlayPop => {
                audio.play_in_channel(sound(Sfx::Pop), &channels.sfx);
            }
            AudioRequest::PlayChime => {
                audio.play_in_channel(sound(Sfx::Chime), &channels.sfx);
            }
            AudioRequest::PlayClick => {
                audio.play_in_channel(sound(Sfx::Click), &channels.sfx);
            }
        }
    }
}

fn set_volumes(audio: Res<Audio>, channels: Res<AudioChannels>) {
    audio.set_volume_in_channel(0.5, &channels.sfx);
    audio.set_volume_in_channel(0.4, &channels.rattle);
}

pub struct Plugin;
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        app.add_plugin(AudioPlugin)
            .init_resource::<AudioChannels>()
            .init_resource::<AudioAssets>()
            .add_event::<AudioRequest>()
            .add_startup_system(set_volumes)
            .add_system(play_audio);
    }
}
